//! Archive orchestrator.
//! Runs Guard -> Cleanup -> Copy -> Commit once per call, in that order, with no
//! internal retry, and folds every outcome into a receipt or a single `ArchiveError`.
//! The boolean hook contract sits on top via `ArchiveHook`.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, trace};

use crate::config::ArchiveConfig;
use crate::errors::ArchiveError;

use super::cleanup::remove_stale_temp;
use super::commit::durable_commit;
use super::guard::ensure_not_archived;
use super::helpers::describe_failure;
use super::io_copy::{copy_file, COPY_BUF_SIZE};
use super::lock::acquire_dir_lock;
use super::paths::ArchivePaths;

/// Interface a host calls to archive one file.
///
/// `true` means the file is durably archived; `false` means it is not, and
/// the reason has already been logged. The host may call again later with the
/// same arguments.
pub trait ArchiveHook {
    fn archive(&self, source_path: &Path, file_name: &str) -> bool;
}

/// One logical archive operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
    pub source_path: PathBuf,
    pub file_name: String,
}

impl ArchiveRequest {
    pub fn new(source_path: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            file_name: file_name.into(),
        }
    }
}

/// Progress of a single attempt. `Committed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveState {
    Start,
    GuardChecked,
    TempCleaned,
    Copied,
    Committed,
    Failed,
}

impl ArchiveState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ArchiveState::Committed | ArchiveState::Failed)
    }
}

impl fmt::Display for ArchiveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArchiveState::Start => "start",
            ArchiveState::GuardChecked => "guard_checked",
            ArchiveState::TempCleaned => "temp_cleaned",
            ArchiveState::Copied => "copied",
            ArchiveState::Committed => "committed",
            ArchiveState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// What a successful attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReceipt {
    pub destination: PathBuf,
    pub bytes: u64,
}

/// Tracks the state of one attempt; only moves forward.
struct Attempt<'a> {
    file_name: &'a str,
    state: ArchiveState,
}

impl<'a> Attempt<'a> {
    fn new(file_name: &'a str) -> Self {
        Self {
            file_name,
            state: ArchiveState::Start,
        }
    }

    fn advance(&mut self, next: ArchiveState) {
        debug_assert!(!self.state.is_terminal(), "advance from terminal state {}", self.state);
        trace!(file = self.file_name, from = %self.state, to = %next, "archive state");
        self.state = next;
    }
}

/// Archives files into one configured directory.
#[derive(Debug, Clone)]
pub struct Archiver {
    archive_directory: Option<PathBuf>,
    lock_directory: bool,
    chunk_size: usize,
}

impl Archiver {
    pub fn new(config: &ArchiveConfig) -> Self {
        Self {
            archive_directory: config
                .archive_directory
                .clone()
                .filter(|p| !p.as_os_str().is_empty()),
            lock_directory: config.lock_directory,
            chunk_size: COPY_BUF_SIZE,
        }
    }

    /// Override the copy chunk size (clamped to at least one byte).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn archive_directory(&self) -> Option<&Path> {
        self.archive_directory.as_deref()
    }

    /// Archive `request.source_path` as `<archive_directory>/<request.file_name>`.
    pub fn try_archive(&self, request: &ArchiveRequest) -> Result<ArchiveReceipt, ArchiveError> {
        let dir = self
            .archive_directory
            .as_deref()
            .ok_or(ArchiveError::NotConfigured)?;
        let paths = ArchivePaths::build(dir, &request.file_name)?;

        let mut attempt = Attempt::new(&request.file_name);
        let result = self.run(dir, &paths, request, &mut attempt);
        match &result {
            Ok(receipt) => {
                attempt.advance(ArchiveState::Committed);
                info!(
                    source = %request.source_path.display(),
                    dest = %receipt.destination.display(),
                    bytes = receipt.bytes,
                    "archived file"
                );
            }
            Err(e) => {
                debug!(file = attempt.file_name, after = %attempt.state, code = e.code(), "archive attempt aborted");
                attempt.advance(ArchiveState::Failed);
            }
        }
        result
    }

    fn run(
        &self,
        dir: &Path,
        paths: &ArchivePaths,
        request: &ArchiveRequest,
        attempt: &mut Attempt<'_>,
    ) -> Result<ArchiveReceipt, ArchiveError> {
        let _lock = if self.lock_directory {
            Some(acquire_dir_lock(dir).map_err(|e| ArchiveError::Lock {
                path: dir.to_path_buf(),
                source: e,
            })?)
        } else {
            None
        };

        ensure_not_archived(&paths.destination)?;
        attempt.advance(ArchiveState::GuardChecked);

        remove_stale_temp(&paths.temp)?;
        attempt.advance(ArchiveState::TempCleaned);

        let mut buf = vec![0u8; self.chunk_size];
        let copied = copy_file(&request.source_path, &paths.temp, &mut buf)?;
        attempt.advance(ArchiveState::Copied);

        durable_commit(&paths.temp, &paths.destination)?;

        Ok(ArchiveReceipt {
            destination: paths.destination.clone(),
            bytes: copied.bytes,
        })
    }
}

impl ArchiveHook for Archiver {
    fn archive(&self, source_path: &Path, file_name: &str) -> bool {
        let request = ArchiveRequest::new(source_path, file_name);
        match self.try_archive(&request) {
            Ok(_) => true,
            Err(e) => {
                error!(
                    code = e.code(),
                    class = ?e.class(),
                    file = file_name,
                    "{}",
                    describe_failure(&e)
                );
                false
            }
        }
    }
}
