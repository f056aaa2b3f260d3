//! Structured error types for tally
//!
//! Using thiserror for automatic Display implementation and error chaining.

use thiserror::Error;

/// Failures while resolving, loading or attaching. All of them are fatal to
/// startup.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("ambiguous selection: {0}")]
    AmbiguousSelection(String),

    #[error("conflicting configuration: {0}")]
    ConfigConflict(String),

    #[error("failed to attach {program} to {point}: {error}")]
    AttachFailed { program: String, point: String, error: String },

    #[error("table {table} cannot be polled as pid -> count: {error}")]
    TableUnusable { table: String, error: String },

    #[error("invalid instrumentation image {path}: {error}")]
    InvalidImage { path: String, error: String },

    #[error(transparent)]
    Load(#[from] aya::EbpfError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SetupError {
    /// True when the failure stems from what the user asked for rather than
    /// from the kernel or the filesystem.
    #[must_use]
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            SetupError::NotFound(_)
                | SetupError::AmbiguousSelection(_)
                | SetupError::ConfigConflict(_)
        )
    }
}

/// Failure reported by the kernel table primitive.
#[derive(Error, Debug)]
pub enum TableError {
    #[error(transparent)]
    Map(#[from] aya::maps::MapError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Table iteration failed partway through a snapshot.
#[derive(Error, Debug)]
#[error("table iteration failed after {read} entries: {source}")]
pub struct ReadError {
    pub read: usize,
    #[source]
    pub source: TableError,
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum LoopError {
    #[error("poll loop already started (state: {0:?})")]
    AlreadyStarted(crate::poll::LoopState),

    #[error(transparent)]
    Render(#[from] RenderError),
}
