//! Snapshot reader
//!
//! Drains a live counting table into a [`Snapshot`].
//!
//! With `reset`, deletion runs as a second phase after the whole table was
//! read: deleting the current key while walking a kernel hash map restarts
//! the walk. A key the kernel bumps between read and delete loses that bump;
//! that race is accepted.
//!
//! The second phase makes the window wider than one key. A key read early in
//! the walk stays exposed until its delete in the second pass, so any bump it
//! takes during the rest of the walk is lost too. The window is bounded by
//! one full walk plus the deletes before it, microseconds for a few thousand
//! keys. Keys the walk never yielded are never deleted, so a process first
//! counted mid-walk is only reported late, not lost.

use log::{debug, warn};
use std::collections::HashSet;

use crate::domain::{Entry, ReadError, Snapshot};
use crate::image::CountTable;

/// Read every `(pid, count)` pair currently in `table`.
///
/// # Errors
/// Returns [`ReadError`] when iteration fails. Nothing is deleted in that
/// case, even with `reset`.
pub fn read<T: CountTable + ?Sized>(table: &mut T, reset: bool) -> Result<Snapshot, ReadError> {
    let mut snapshot = Snapshot::new();
    let mut seen = HashSet::new();

    for item in table.entries() {
        let (pid, count) = item.map_err(|source| ReadError { read: snapshot.len(), source })?;
        if !seen.insert(pid) {
            debug!("Key {pid} yielded twice during one walk, keeping first value");
            continue;
        }
        snapshot.push(Entry::new(pid, count));
    }

    if reset {
        for entry in snapshot.entries() {
            if let Err(e) = table.remove(entry.pid.0) {
                warn!("Failed to reset counter for {}: {e}", entry.pid);
            }
        }
    }

    Ok(snapshot)
}
