//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - The archive directory goes through the same validator as every other setter.
//!
//! Format:
//! <config>
//!   <archive_directory>/path/to/archive</archive_directory>
//!   <log_level>normal</log_level>
//!   <log_file>/path/to/basic_archive.log</log_file>
//!   <lock_directory>false</lock_directory>
//! </config>
//!
//! Unknown fields are rejected to surface misconfigurations early.

use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::paths::default_config_path;
use super::types::{ArchiveConfig, LogLevel};
use crate::errors::ConfigError;

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    archive_directory: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    #[serde(default, deserialize_with = "de_bool_trimmed_opt")]
    lock_directory: Option<bool>,
}

// Tolerates surrounding whitespace: <lock_directory> true </lock_directory>
fn de_bool_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some("true") | Some("1") | Some("yes") => Ok(Some(true)),
        Some("false") | Some("0") | Some("no") => Ok(Some(false)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid boolean for lock_directory: '{other}'"
        ))),
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse XML text into a validated ArchiveConfig. `origin` only labels errors.
pub fn parse_config_xml(contents: &str, origin: &Path) -> Result<ArchiveConfig, ConfigError> {
    let parsed: XmlConfig = from_xml_str(contents).map_err(|e| ConfigError::Xml {
        path: origin.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut cfg = ArchiveConfig::default();
    if let Some(dir) = non_empty(parsed.archive_directory.as_deref()) {
        cfg.set_archive_directory(dir)?;
    }
    if let Some(level) = non_empty(parsed.log_level.as_deref()) {
        cfg.log_level = level.parse::<LogLevel>().map_err(|message| ConfigError::Xml {
            path: origin.to_path_buf(),
            message,
        })?;
    }
    cfg.log_file = non_empty(parsed.log_file.as_deref()).map(PathBuf::from);
    cfg.lock_directory = parsed.lock_directory.unwrap_or(false);
    Ok(cfg)
}

/// Load a config from a specific XML file.
pub fn load_config_from_xml_path(path: &Path) -> Result<ArchiveConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config_xml(&contents, path)
}

/// Load the config from `default_config_path()`. Ok(None) when no file exists there.
pub fn load_config() -> Result<Option<ArchiveConfig>, ConfigError> {
    let Some(path) = default_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        debug!("no config file at {}", path.display());
        return Ok(None);
    }
    debug!("loading config from {}", path.display());
    load_config_from_xml_path(&path).map(Some)
}
