//! Durable commit: the rename is the single observable commit point.
//! - Syncs the closed temp file's contents to stable storage.
//! - Renames temp -> destination without ever replacing an existing destination.
//! - Syncs the containing directory so the rename itself survives a crash.
//!
//! On failure the temp file is left in place; the next attempt's cleanup removes it.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use tempfile::TempPath;
use tracing::trace;

use crate::errors::ArchiveError;
use crate::platform::{close_file, fsync_dir};

/// Make `temp` durable under the name `dest`.
///
/// After `Ok(())`, `dest` holds the content durably and `temp` is gone. A crash
/// part-way leaves either temp without dest or dest without temp.
pub fn durable_commit(temp: &Path, dest: &Path) -> Result<(), ArchiveError> {
    let commit_err = |source: io::Error| ArchiveError::Commit {
        temp: temp.to_path_buf(),
        dest: dest.to_path_buf(),
        source,
    };

    sync_file(temp).map_err(commit_err)?;
    trace!(path = %temp.display(), "temporary file synced");

    rename_no_replace(temp, dest).map_err(commit_err)?;
    trace!(temp = %temp.display(), dest = %dest.display(), "renamed into place");

    if let Some(parent) = dest.parent() {
        let dir = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };
        fsync_dir(dir).map_err(commit_err)?;
    }
    Ok(())
}

/// Rename `temp` to `dest`, failing with `AlreadyExists` rather than replacing `dest`.
/// The temp file stays on disk when the rename fails.
fn rename_no_replace(temp: &Path, dest: &Path) -> io::Result<()> {
    TempPath::from_path(temp)
        .persist_noclobber(dest)
        .map_err(|e| {
            // Disarm delete-on-drop; cleanup owns the leftover temp.
            let _ = e.path.keep();
            e.error
        })
}

/// Reopen `path` and fsync it. Opened for writing because some platforms refuse to flush read-only handles.
fn sync_file(path: &Path) -> io::Result<()> {
    let f = OpenOptions::new().read(true).write(true).open(path)?;
    f.sync_all()?;
    close_file(f)
}
