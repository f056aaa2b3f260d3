//! # Instrumentation Images
//!
//! An instrumentation image is a compiled BPF object after it has been loaded:
//! a set of named programs (each declaring an attach section such as
//! `tracepoint/syscalls/sys_enter_execve`) and a set of named tables.
//!
//! ## Seams
//!
//! - [`Image`] - what the resolver and the attachment handle need from a
//!   loaded image: a [`Catalog`], attach/detach, and opening a table.
//! - [`CountTable`] - what the snapshot reader needs from a kernel table:
//!   iteration over `(pid, count)` pairs and delete-by-key.
//!
//! [`LoadedImage`] and [`KernelTable`] implement both on top of aya.

pub mod loaded;
pub mod sections;

pub use loaded::{KernelTable, LoadedImage};
pub use sections::program_sections;

use crate::domain::{AttachPoint, SetupError, TableError};

/// A program in the image and the attach section it was compiled into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    pub name: String,
    pub section: String,
}

impl ProgramInfo {
    pub fn new(name: impl Into<String>, section: impl Into<String>) -> Self {
        Self { name: name.into(), section: section.into() }
    }
}

/// Kind of a kernel table, as far as polling is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Hash,
    LruHash,
    PerCpuHash,
    PerCpuLruHash,
    Other(&'static str),
}

impl TableKind {
    /// Hash-family tables hold arbitrary keys and are the natural home of
    /// per-process counters.
    #[must_use]
    pub fn is_hash_family(self) -> bool {
        !matches!(self, TableKind::Other(_))
    }
}

/// A table in the image and its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub kind: TableKind,
}

impl TableInfo {
    pub fn new(name: impl Into<String>, kind: TableKind) -> Self {
        Self { name: name.into(), kind }
    }
}

/// Names, sections and kinds of everything in an image.
///
/// Order is whatever the underlying image yields and carries no meaning.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub programs: Vec<ProgramInfo>,
    pub tables: Vec<TableInfo>,
}

/// A loaded instrumentation image.
pub trait Image {
    /// Token identifying one attachment of one program.
    type Link;
    /// Table handle returned by [`Image::open_table`].
    type Table: CountTable;

    fn catalog(&self) -> Catalog;

    /// Load `program` into the kernel and attach it at `point`.
    ///
    /// # Errors
    /// `SetupError::AttachFailed` when the kernel refuses the program or the
    /// attach point, `SetupError::NotFound` when the program is absent.
    fn attach(&mut self, program: &str, point: &AttachPoint) -> Result<Self::Link, SetupError>;

    /// Detach a link previously returned by [`Image::attach`].
    ///
    /// # Errors
    /// Returns an error if the kernel rejects the detach.
    fn detach(&mut self, program: &str, link: Self::Link) -> Result<(), SetupError>;

    /// Take the named table out of the image for polling.
    ///
    /// # Errors
    /// `SetupError::NotFound` when absent, `SetupError::TableUnusable` when it
    /// cannot be read as `u32 -> u64`.
    fn open_table(&mut self, name: &str) -> Result<Self::Table, SetupError>;
}

/// Iterator over `(pid, count)` pairs of a table.
pub type Entries<'a> = Box<dyn Iterator<Item = Result<(u32, u64), TableError>> + 'a>;

/// A kernel-resident `pid -> count` table.
///
/// Iteration order is unspecified and the kernel keeps writing while it runs.
pub trait CountTable {
    fn entries(&self) -> Entries<'_>;

    /// # Errors
    /// Returns an error if the key could not be deleted.
    fn remove(&mut self, pid: u32) -> Result<(), TableError>;
}

impl<T: CountTable + ?Sized> CountTable for &mut T {
    fn entries(&self) -> Entries<'_> {
        (**self).entries()
    }

    fn remove(&mut self, pid: u32) -> Result<(), TableError> {
        (**self).remove(pid)
    }
}
