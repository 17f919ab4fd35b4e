//! Removal of a temp file left behind by an interrupted attempt.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, trace};

use crate::errors::ArchiveError;

/// Unlink `temp`. Missing is the normal case; any other failure is `Cleanup`.
///
/// The copier creates the temp file with exclusive creation, so this must
/// succeed before every copy.
pub fn remove_stale_temp(temp: &Path) -> Result<(), ArchiveError> {
    match fs::remove_file(temp) {
        Ok(()) => {
            debug!(path = %temp.display(), "removed stale temporary file");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            trace!(path = %temp.display(), "no stale temporary file");
            Ok(())
        }
        Err(e) => Err(ArchiveError::Cleanup {
            path: temp.to_path_buf(),
            source: e,
        }),
    }
}
