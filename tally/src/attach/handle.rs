//! Attachment lifetime
//!
//! [`AttachmentHandle`] owns the image, the live probe link and the opened
//! table. Each acquisition step stores what it acquired in the handle before
//! the next step runs, so an early return at any step drops the handle and
//! [`Drop`] unwinds whatever was taken so far: probe, then table, then image.

use log::{debug, info, warn};

use crate::domain::{AttachPoint, SetupError};
use crate::image::Image;

pub struct AttachmentHandle<I: Image> {
    program: String,
    link: Option<I::Link>,
    table: Option<I::Table>,
    image: Option<I>,
}

impl<I: Image> AttachmentHandle<I> {
    /// Attach `program` at `point`, taking ownership of the image.
    ///
    /// # Errors
    /// Returns the attach failure; the image is released before returning.
    pub fn acquire(mut image: I, program: &str, point: &AttachPoint) -> Result<Self, SetupError> {
        let link = image.attach(program, point)?;
        Ok(Self {
            program: program.to_string(),
            link: Some(link),
            table: None,
            image: Some(image),
        })
    }

    /// Open the table to poll. Replaces any previously opened table.
    ///
    /// # Errors
    /// Returns an error if the handle was released or the table cannot be
    /// opened.
    pub fn open_table(&mut self, name: &str) -> Result<(), SetupError> {
        let image = self
            .image
            .as_mut()
            .ok_or_else(|| SetupError::NotFound(format!("image for table '{name}' (released)")))?;
        self.table = Some(image.open_table(name)?);
        debug!("Opened table {name}");
        Ok(())
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.link.is_some()
    }

    pub fn table_mut(&mut self) -> Option<&mut I::Table> {
        self.table.as_mut()
    }

    /// Detach the probe, close the table and release the image.
    ///
    /// Every step is best-effort and later calls are no-ops.
    pub fn release(&mut self) {
        if let Some(link) = self.link.take() {
            match self.image.as_mut() {
                Some(image) => match image.detach(&self.program, link) {
                    Ok(()) => debug!("Detached {}", self.program),
                    Err(e) => warn!("Failed to detach {}: {e}", self.program),
                },
                None => warn!("Probe link for {} outlived its image", self.program),
            }
        }
        self.table = None;
        if self.image.take().is_some() {
            info!("Released instrumentation image ({})", self.program);
        }
    }
}

impl<I: Image> Drop for AttachmentHandle<I> {
    fn drop(&mut self) {
        self.release();
    }
}
