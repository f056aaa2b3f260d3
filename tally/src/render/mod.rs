//! Report rendering
//!
//! One [`Report`] per tick, written either as an aligned text table for a
//! terminal or as one JSON object per line for machines.
//!
//! JSON shape (stable):
//!
//! ```json
//! {"at":"2026-10-18T09:00:02.000000001Z","tp_category":"syscalls",
//!  "tp_name":"sys_enter_execve","program":"count_exec","map":"exec_counter",
//!  "top":[{"pid":1234,"count":42}]}
//! ```

pub mod json;
pub mod text;

pub use json::JsonRenderer;
pub use text::TextRenderer;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use std::io::Write;

use crate::domain::{Entry, RankedView, RenderError, Target};

/// One tick's worth of output.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub target: &'a Target,
    pub top: &'a [Entry],
}

impl<'a> Report<'a> {
    #[must_use]
    pub fn new(target: &'a Target, view: &'a RankedView) -> Self {
        Self { at: Utc::now(), target, top: view.entries() }
    }
}

pub trait Render {
    /// # Errors
    /// Returns an error if the report cannot be written.
    fn render(&mut self, report: &Report<'_>) -> Result<(), RenderError>;
}

impl<R: Render + ?Sized> Render for Box<R> {
    fn render(&mut self, report: &Report<'_>) -> Result<(), RenderError> {
        (**self).render(report)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned table for terminals
    Table,
    /// One JSON object per tick
    Json,
}

impl OutputFormat {
    pub fn renderer<W: Write + 'static>(self, out: W) -> Box<dyn Render> {
        match self {
            OutputFormat::Table => Box::new(TextRenderer::new(out)),
            OutputFormat::Json => Box::new(JsonRenderer::new(out)),
        }
    }
}
