//! Startup: resolve, attach, open
//!
//! [`establish`] turns a loaded image plus user overrides into a live
//! [`AttachmentHandle`]. Nothing stays attached when it fails.

pub mod handle;

pub use handle::AttachmentHandle;

use crate::domain::{SetupError, Target};
use crate::image::Image;
use crate::resolve::{resolve, Overrides, Selection};

/// A live attachment and what was selected to produce it.
pub struct Session<I: Image> {
    pub handle: AttachmentHandle<I>,
    pub selection: Selection,
}

impl<I: Image> Session<I> {
    #[must_use]
    pub fn target(&self) -> Target {
        Target::new(&self.selection.attach_point, &self.selection.program.name, &self.selection.table.name)
    }
}

/// Resolve what to observe, attach the probe and open the table.
///
/// # Errors
/// Any resolver, attach or table failure. The probe is detached and the image
/// released before the error is returned.
pub fn establish<I: Image>(image: I, overrides: &Overrides) -> Result<Session<I>, SetupError> {
    let selection = resolve(&image.catalog(), overrides)?;
    let mut handle =
        AttachmentHandle::acquire(image, &selection.program.name, &selection.attach_point)?;
    handle.open_table(&selection.table.name)?;
    Ok(Session { handle, selection })
}
