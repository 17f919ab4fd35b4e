//! Config module.
//! Provides configuration types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{ArchiveConfig, LogLevel};
pub use validate::check_archive_directory;
pub use xml::{load_config, load_config_from_xml_path, parse_config_xml};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "BASIC_ARCHIVE_CONFIG";
