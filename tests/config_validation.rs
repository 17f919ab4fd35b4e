use assert_fs::prelude::*;
use assert_fs::TempDir;
use basic_archive::config::{load_config, load_config_from_xml_path};
use basic_archive::{check_archive_directory, ArchiveConfig, ConfigError, LogLevel, CONFIG_ENV_VAR};
use serial_test::serial;

#[test]
fn nonexistent_directory_rejected_at_set_time() {
    let td = TempDir::new().unwrap();
    let mut cfg = ArchiveConfig::default();
    let err = cfg.set_archive_directory(td.child("nope").path()).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
    assert!(err.to_string().contains("does not exist"));
    assert!(cfg.archive_directory().is_none());
}

#[test]
fn file_is_not_a_valid_archive_directory() {
    let td = TempDir::new().unwrap();
    let f = td.child("file");
    f.touch().unwrap();
    assert!(matches!(
        check_archive_directory(f.path()),
        Err(ConfigError::NotADirectory(_))
    ));
}

#[test]
fn xml_file_is_loaded_and_validated() {
    let td = TempDir::new().unwrap();
    let archive = td.child("archive");
    archive.create_dir_all().unwrap();
    let cfg_file = td.child("config.xml");
    cfg_file
        .write_str(&format!(
            "<config>\n  <archive_directory>{}</archive_directory>\n  <log_level>info</log_level>\n</config>\n",
            archive.path().display()
        ))
        .unwrap();

    let cfg = load_config_from_xml_path(cfg_file.path()).unwrap();
    assert_eq!(cfg.archive_directory(), Some(archive.path()));
    assert_eq!(cfg.log_level, LogLevel::Info);
}

#[test]
fn unreadable_config_path_is_a_read_error() {
    let td = TempDir::new().unwrap();
    let err = load_config_from_xml_path(td.child("missing.xml").path()).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
#[serial]
fn env_var_selects_config_file() {
    let td = TempDir::new().unwrap();
    let archive = td.child("archive");
    archive.create_dir_all().unwrap();
    let cfg_file = td.child("custom.xml");
    cfg_file
        .write_str(&format!(
            "<config><archive_directory>{}</archive_directory><lock_directory>true</lock_directory></config>",
            archive.path().display()
        ))
        .unwrap();

    unsafe {
        std::env::set_var(CONFIG_ENV_VAR, cfg_file.path());
    }
    let loaded = load_config();
    unsafe {
        std::env::remove_var(CONFIG_ENV_VAR);
    }

    let cfg = loaded.unwrap().expect("config file found");
    assert_eq!(cfg.archive_directory(), Some(archive.path()));
    assert!(cfg.lock_directory);
}

#[test]
#[serial]
fn env_var_pointing_nowhere_means_no_config() {
    let td = TempDir::new().unwrap();
    unsafe {
        std::env::set_var(CONFIG_ENV_VAR, td.child("absent.xml").path());
    }
    let loaded = load_config();
    unsafe {
        std::env::remove_var(CONFIG_ENV_VAR);
    }
    assert!(loaded.unwrap().is_none());
}

#[test]
#[serial]
fn env_var_with_invalid_directory_is_rejected() {
    let td = TempDir::new().unwrap();
    let cfg_file = td.child("bad.xml");
    cfg_file
        .write_str(&format!(
            "<config><archive_directory>{}</archive_directory></config>",
            td.child("missing").path().display()
        ))
        .unwrap();
    unsafe {
        std::env::set_var(CONFIG_ENV_VAR, cfg_file.path());
    }
    let loaded = load_config();
    unsafe {
        std::env::remove_var(CONFIG_ENV_VAR);
    }
    assert!(matches!(loaded, Err(ConfigError::NotFound(_))));
}
