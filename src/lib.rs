//! Core library for `basic_archive`.
//!
//! Archives one file at a time into a configured directory, crash-safely and
//! at most once per file name: existence guard, stale temp cleanup, streamed
//! copy into a fixed temp name, then fsync + no-replace rename + directory fsync.
//!
//! Hosts construct an `ArchiveConfig`, build an `Archiver` from it, and call it
//! through the `ArchiveHook` trait.

pub mod archive;
pub mod cli;
pub mod config;
pub mod errors;
pub mod output;
pub mod platform;
pub mod shutdown;

pub use archive::{
    durable_commit, ArchiveHook, ArchivePaths, ArchiveReceipt, ArchiveRequest, ArchiveState,
    Archiver, COPY_BUF_SIZE, MAX_PATH_LEN, TEMP_FILE_NAME,
};
pub use config::{
    check_archive_directory, default_config_path, default_log_path, path_has_symlink_ancestor,
    ArchiveConfig, LogLevel, CONFIG_ENV_VAR,
};
pub use errors::{ArchiveError, ConfigError, FailureClass};
