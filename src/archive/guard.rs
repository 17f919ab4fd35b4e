//! Existence guard: an archived name is never written twice.

use std::fs;
use std::io;
use std::path::Path;
use tracing::trace;

use crate::errors::ArchiveError;

/// Refuse when `destination` already exists.
///
/// - present: `AlreadyArchived` (conflict, no overwrite is ever attempted)
/// - absent: Ok
/// - any other stat failure: `Stat`, carrying the OS error
///
/// Uses `symlink_metadata` so a dangling symlink at the destination still counts as present.
pub fn ensure_not_archived(destination: &Path) -> Result<(), ArchiveError> {
    match fs::symlink_metadata(destination) {
        Ok(_) => Err(ArchiveError::AlreadyArchived(destination.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            trace!(path = %destination.display(), "destination absent");
            Ok(())
        }
        Err(e) => Err(ArchiveError::Stat {
            path: destination.to_path_buf(),
            source: e,
        }),
    }
}
