//! Typed error definitions for basic_archive.
//! One variant per failure mode of an archive attempt, plus configuration errors.
//! Callers at the hook boundary only see a boolean; these types carry the diagnostic.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification used by callers deciding whether a retry makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Archive directory unset; permanent until reconfigured.
    Configuration,
    /// Destination already present; needs a human to reconcile.
    Conflict,
    /// Filesystem call failed; a later retry may succeed.
    Transient,
    /// Bad caller input; permanent for that input.
    Input,
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive directory not specified")]
    NotConfigured,

    #[error("archive destination path too long: {len} bytes exceeds limit of {max} (directory '{dir}', file '{file_name}')")]
    PathTooLong {
        dir: PathBuf,
        file_name: String,
        len: usize,
        max: usize,
    },

    #[error("invalid archive file name '{0}'")]
    InvalidFileName(String),

    #[error("archive file \"{0}\" already exists")]
    AlreadyArchived(PathBuf),

    #[error("could not stat file \"{}\": {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not unlink file \"{}\": {source}", path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not open file \"{}\": {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not read file \"{}\": {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write to file \"{}\": {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not close file \"{}\": {source}", path.display())]
    Close {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not commit \"{}\" to \"{}\": {source}", temp.display(), dest.display())]
    Commit {
        temp: PathBuf,
        dest: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not lock archive directory \"{}\": {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ArchiveError {
    pub fn class(&self) -> FailureClass {
        match self {
            ArchiveError::NotConfigured => FailureClass::Configuration,
            ArchiveError::AlreadyArchived(_) => FailureClass::Conflict,
            ArchiveError::PathTooLong { .. } | ArchiveError::InvalidFileName(_) => FailureClass::Input,
            ArchiveError::Stat { .. }
            | ArchiveError::Cleanup { .. }
            | ArchiveError::Open { .. }
            | ArchiveError::Read { .. }
            | ArchiveError::Write { .. }
            | ArchiveError::Close { .. }
            | ArchiveError::Commit { .. }
            | ArchiveError::Lock { .. } => FailureClass::Transient,
        }
    }

    /// Stable short code for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            ArchiveError::NotConfigured => "not_configured",
            ArchiveError::PathTooLong { .. } => "path_too_long",
            ArchiveError::InvalidFileName(_) => "invalid_file_name",
            ArchiveError::AlreadyArchived(_) => "already_archived",
            ArchiveError::Stat { .. } => "stat_error",
            ArchiveError::Cleanup { .. } => "cleanup_error",
            ArchiveError::Open { .. } => "open_error",
            ArchiveError::Read { .. } => "read_error",
            ArchiveError::Write { .. } => "write_error",
            ArchiveError::Close { .. } => "close_error",
            ArchiveError::Commit { .. } => "commit_error",
            ArchiveError::Lock { .. } => "lock_error",
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.class() == FailureClass::Transient
    }

    /// Underlying OS error, when the failure came from a filesystem call.
    pub fn io_source(&self) -> Option<&io::Error> {
        match self {
            ArchiveError::Stat { source, .. }
            | ArchiveError::Cleanup { source, .. }
            | ArchiveError::Open { source, .. }
            | ArchiveError::Read { source, .. }
            | ArchiveError::Write { source, .. }
            | ArchiveError::Close { source, .. }
            | ArchiveError::Commit { source, .. }
            | ArchiveError::Lock { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Rejections from the archive directory validator.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("specified archive directory does not exist: {0}")]
    NotFound(PathBuf),

    #[error("specified archive directory is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("cannot access archive directory {}: {source}", path.display())]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse config file {}: {message}", path.display())]
    Xml { path: PathBuf, message: String },
}
