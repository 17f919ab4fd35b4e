//! Destination and temporary path derivation.
//! Pure: no filesystem access happens here.

use std::path::{Path, PathBuf};

use crate::errors::ArchiveError;

use super::lock::LOCK_FILE_NAME;

/// Fixed name of the in-flight copy inside the archive directory.
pub const TEMP_FILE_NAME: &str = "archtemp";

/// Longest supported path in bytes, terminator included.
pub const MAX_PATH_LEN: usize = 1024;

/// Paths for one archive attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePaths {
    pub destination: PathBuf,
    pub temp: PathBuf,
}

impl ArchivePaths {
    /// Derive `<dir>/<file_name>` and `<dir>/archtemp`.
    ///
    /// Fails with `PathTooLong` when either joined path (separator and
    /// terminator included) would not fit in `MAX_PATH_LEN`, and with
    /// `InvalidFileName` when `file_name` is not a single path component or
    /// names one of the archiver's own files (`archtemp`, `.archtemp.lock`).
    pub fn build(dir: &Path, file_name: &str) -> Result<Self, ArchiveError> {
        validate_file_name(file_name)?;

        let dir_len = dir.as_os_str().len();
        let longest = file_name.len().max(TEMP_FILE_NAME.len());
        let len = dir_len + longest + 2;
        if len >= MAX_PATH_LEN {
            return Err(ArchiveError::PathTooLong {
                dir: dir.to_path_buf(),
                file_name: file_name.to_string(),
                len,
                max: MAX_PATH_LEN,
            });
        }

        Ok(Self {
            destination: dir.join(file_name),
            temp: dir.join(TEMP_FILE_NAME),
        })
    }
}

fn validate_file_name(file_name: &str) -> Result<(), ArchiveError> {
    let bad = file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name == TEMP_FILE_NAME
        || file_name == LOCK_FILE_NAME
        || file_name.contains(['/', '\\', '\0']);
    if bad {
        return Err(ArchiveError::InvalidFileName(file_name.to_string()));
    }
    Ok(())
}
