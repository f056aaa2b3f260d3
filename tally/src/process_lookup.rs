//! Process names for table keys.

use std::fs;

use crate::domain::Pid;

/// Command name of `pid`, or `None` if the process is gone or unreadable.
///
/// Reads `/proc/<pid>/comm`, falling back to the `(comm)` field of
/// `/proc/<pid>/stat`.
#[must_use]
pub fn command_name(pid: Pid) -> Option<String> {
    if let Ok(comm) = fs::read_to_string(format!("/proc/{}/comm", pid.0)) {
        let comm = comm.trim();
        if !comm.is_empty() {
            return Some(comm.to_string());
        }
    }
    let stat = fs::read_to_string(format!("/proc/{}/stat", pid.0)).ok()?;
    extract_comm(&stat)
}

/// Extract command name from `/proc/<pid>/stat`.
/// Format: "pid (comm) state ..."
fn extract_comm(stat_line: &str) -> Option<String> {
    let open = stat_line.find('(')?;
    let close = stat_line.rfind(')')?;
    if open >= close {
        return None;
    }
    Some(stat_line[open + 1..close].to_string())
}
