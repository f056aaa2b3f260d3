//! Human-readable rendering
//!
//! ```text
//! 2026-10-18T09:00:02Z  syscalls:sys_enter_execve  count_exec -> exec_counter
//!      PID         COUNT  COMM
//!     1234            42  bash
//! ```

use chrono::SecondsFormat;
use std::io::Write;

use super::{Render, Report};
use crate::domain::{Pid, RenderError};
use crate::process_lookup::command_name;

/// Writes each report as a header line and an aligned table.
pub struct TextRenderer<W: Write> {
    out: W,
    names: fn(Pid) -> Option<String>,
}

impl<W: Write> TextRenderer<W> {
    /// Renderer that looks process names up in `/proc`.
    pub fn new(out: W) -> Self {
        Self::with_names(out, command_name)
    }

    pub fn with_names(out: W, names: fn(Pid) -> Option<String>) -> Self {
        Self { out, names }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Render for TextRenderer<W> {
    fn render(&mut self, report: &Report<'_>) -> Result<(), RenderError> {
        let target = report.target;
        writeln!(
            self.out,
            "{}  {}:{}  {} -> {}",
            report.at.to_rfc3339_opts(SecondsFormat::Secs, true),
            target.category,
            target.name,
            target.program,
            target.table
        )?;

        if report.top.is_empty() {
            writeln!(self.out, "  (no entries)")?;
        } else {
            writeln!(self.out, "{:>8}  {:>12}  COMM", "PID", "COUNT")?;
            for entry in report.top {
                let comm = (self.names)(entry.pid).unwrap_or_else(|| "-".to_string());
                writeln!(self.out, "{:>8}  {:>12}  {comm}", entry.pid.0, entry.count)?;
            }
        }
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
