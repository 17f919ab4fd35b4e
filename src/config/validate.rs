//! Archive directory validation.
//! Runs when the value is set, never per archive call.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, error};

use crate::errors::ConfigError;

use super::types::ArchiveConfig;

/// Accept an empty value (archiving disabled) or an existing directory.
pub fn check_archive_directory(candidate: &Path) -> Result<(), ConfigError> {
    if candidate.as_os_str().is_empty() {
        return Ok(());
    }
    match fs::metadata(candidate) {
        Ok(meta) if meta.is_dir() => {
            debug!("archive_directory valid: {}", candidate.display());
            Ok(())
        }
        Ok(_) => {
            error!("archive_directory is not a directory: {}", candidate.display());
            Err(ConfigError::NotADirectory(candidate.to_path_buf()))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            error!("archive_directory does not exist: {}", candidate.display());
            Err(ConfigError::NotFound(candidate.to_path_buf()))
        }
        Err(e) => {
            error!("archive_directory cannot be accessed: {}: {}", candidate.display(), e);
            Err(ConfigError::Inaccessible {
                path: candidate.to_path_buf(),
                source: e,
            })
        }
    }
}

impl ArchiveConfig {
    /// Validate and store the archive directory. On rejection the previous value is kept.
    pub fn set_archive_directory(&mut self, value: impl AsRef<Path>) -> Result<(), ConfigError> {
        let value = value.as_ref();
        check_archive_directory(value)?;
        self.archive_directory = if value.as_os_str().is_empty() {
            None
        } else {
            Some(value.to_path_buf())
        };
        Ok(())
    }
}
