//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers keep kernel table keys, counters and attach
//! coordinates from being mixed up, and make function signatures more
//! expressive.

use serde::Serialize;
use std::fmt;

/// Process ID
///
/// Keys of the counting table are process IDs (TGID in kernel terms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID:{}", self.0)
    }
}

impl From<u32> for Pid {
    fn from(pid: u32) -> Self {
        Pid(pid)
    }
}

/// One observed table entry: a process and its counter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub pid: Pid,
    pub count: u64,
}

impl Entry {
    #[must_use]
    pub fn new(pid: u32, count: u64) -> Self {
        Self { pid: Pid(pid), count }
    }
}

/// Tracepoint coordinates: `category/name` under `/sys/kernel/tracing/events`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachPoint {
    pub category: String,
    pub name: String,
}

impl AttachPoint {
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self { category: category.into(), name: name.into() }
    }
}

impl fmt::Display for AttachPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.name)
    }
}

/// Point-in-time view of the counting table, in table iteration order.
///
/// Recreated every tick. Never contains the same PID twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<Entry>,
}

impl Snapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

impl From<Vec<Entry>> for Snapshot {
    fn from(entries: Vec<Entry>) -> Self {
        Self { entries }
    }
}

impl From<RankedView> for Snapshot {
    fn from(view: RankedView) -> Self {
        Self { entries: view.entries }
    }
}

/// Sorted, truncated prefix of a [`Snapshot`], consumed by a renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedView {
    entries: Vec<Entry>,
}

impl RankedView {
    /// Wrap entries that are already ranked.
    pub(crate) fn from_ranked(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

/// What is being observed: the attached program and the polled table.
///
/// Stamped on every report so consumers of the JSON stream can tell
/// records from different probes apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    #[serde(rename = "tp_category")]
    pub category: String,
    #[serde(rename = "tp_name")]
    pub name: String,
    pub program: String,
    #[serde(rename = "map")]
    pub table: String,
}

impl Target {
    #[must_use]
    pub fn new(point: &AttachPoint, program: &str, table: &str) -> Self {
        Self {
            category: point.category.clone(),
            name: point.name.clone(),
            program: program.to_string(),
            table: table.to_string(),
        }
    }

    #[must_use]
    pub fn attach_point(&self) -> AttachPoint {
        AttachPoint::new(&self.category, &self.name)
    }
}
