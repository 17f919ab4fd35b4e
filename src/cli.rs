//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - FILE_NAME defaults to the last component of SOURCE_PATH.
//! - --debug is a shorthand for --log-level debug.
//! - CLI flags override values from the XML config file.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use crate::config::types::{ArchiveConfig, LogLevel};
use crate::errors::ConfigError;

/// Archive a file into the configured archive directory, exactly once.
/// Exits 0 when the file is durably archived, 1 otherwise.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Durably archive a file into an archive directory (write-once)"
)]
pub struct Args {
    /// File to archive.
    #[arg(value_name = "SOURCE_PATH", value_hint = ValueHint::FilePath)]
    pub source_path: Option<PathBuf>,

    /// Name to archive under (defaults to the source file's name).
    #[arg(value_name = "FILE_NAME")]
    pub file_name: Option<String>,

    /// Override the archive directory (normally configured via XML).
    #[arg(long, value_hint = ValueHint::DirPath, help = "Override the archive directory")]
    pub archive_directory: Option<PathBuf>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Additionally write logs to this file.
    #[arg(long, value_hint = ValueHint::FilePath, help = "Also write logs to this file")]
    pub log_file: Option<PathBuf>,

    /// Serialise concurrent archivers with a lock file in the archive directory.
    #[arg(long, help = "Hold an advisory lock on the archive directory while archiving")]
    pub lock: bool,

    /// Validate configuration and exit.
    #[arg(long, help = "Validate the archive directory configuration and exit")]
    pub check: bool,

    /// Print where basic_archive will look for the config file, then exit.
    #[arg(
        long,
        help = "Print the config file location used by basic_archive and exit"
    )]
    pub print_config: bool,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,
}

impl Args {
    /// Archive name: FILE_NAME if given, else the final component of SOURCE_PATH.
    pub fn resolved_file_name(&self) -> Option<String> {
        if let Some(name) = &self.file_name {
            return Some(name.clone());
        }
        self.source_path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded config. The archive directory goes
    /// through the validator, so a bad value is rejected here.
    pub fn apply_overrides(&self, cfg: &mut ArchiveConfig) -> Result<(), ConfigError> {
        if let Some(dir) = &self.archive_directory {
            cfg.set_archive_directory(dir)?;
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(lf) = &self.log_file {
            cfg.log_file = Some(lf.clone());
        }
        if self.lock {
            cfg.lock_directory = true;
        }
        Ok(())
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use tempfile::tempdir;

    #[test]
    fn file_name_defaults_to_source_name() {
        let args = Args::try_parse_from(["basic_archive", "/wal/000000010000000000000003"]).unwrap();
        assert_eq!(args.resolved_file_name().as_deref(), Some("000000010000000000000003"));

        let args = Args::try_parse_from(["basic_archive", "/wal/x", "renamed"]).unwrap();
        assert_eq!(args.resolved_file_name().as_deref(), Some("renamed"));
    }

    #[test]
    fn debug_beats_log_level() {
        let args = Args::try_parse_from(["basic_archive", "--log-level", "quiet", "-d"]).unwrap();
        assert_eq!(args.effective_log_level(), Some(LogLevel::Debug));
    }

    #[test]
    fn overrides_validate_archive_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let args = Args::try_parse_from([
            OsStr::new("basic_archive"),
            OsStr::new("--archive-directory"),
            missing.as_os_str(),
        ])
        .unwrap();
        let mut cfg = ArchiveConfig::default();
        assert!(matches!(args.apply_overrides(&mut cfg), Err(ConfigError::NotFound(_))));

        let args = Args::try_parse_from([
            OsStr::new("basic_archive"),
            OsStr::new("--lock"),
            OsStr::new("--archive-directory"),
            dir.path().as_os_str(),
        ])
        .unwrap();
        args.apply_overrides(&mut cfg).unwrap();
        assert_eq!(cfg.archive_directory(), Some(dir.path()));
        assert!(cfg.lock_directory);
    }
}
