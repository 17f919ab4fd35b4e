use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use basic_archive::{ArchiveConfig, ArchiveHook, Archiver};
use tempfile::tempdir;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt as tsfmt, registry};

/// A simple writer that appends written bytes into an in-memory Vec<u8>.
#[derive(Clone)]
struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a scoped JSON subscriber and return the captured lines.
fn capture_json<F: FnOnce()>(filter: &str, f: F) -> Vec<serde_json::Value> {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let make_writer = {
        let buf = buf.clone();
        move || BufferWriter(buf.clone())
    };
    let layer = tsfmt::layer().json().with_writer(make_writer);
    let subscriber = registry().with(EnvFilter::new(filter)).with(layer);
    let dispatch = tracing::Dispatch::new(subscriber);
    tracing::dispatcher::with_default(&dispatch, f);

    let contents = String::from_utf8_lossy(&buf.lock().unwrap()).to_string();
    contents
        .lines()
        .map(|l| serde_json::from_str(l).expect("each log line is JSON"))
        .collect()
}

#[test]
fn conflict_is_logged_as_an_error_naming_the_destination() {
    let td = tempdir().unwrap();
    let archive = td.path().join("archive");
    std::fs::create_dir_all(&archive).unwrap();
    std::fs::write(archive.join("seg"), b"already here").unwrap();
    let src = td.path().join("seg");
    std::fs::write(&src, b"new").unwrap();

    let mut cfg = ArchiveConfig::default();
    cfg.set_archive_directory(&archive).unwrap();
    let archiver = Archiver::new(&cfg);

    let mut ok = true;
    let lines = capture_json("info", || ok = archiver.archive(&src, "seg"));
    assert!(!ok);

    let failure = lines
        .iter()
        .find(|l| l["level"] == "ERROR")
        .unwrap_or_else(|| panic!("no error logged: {lines:?}"));
    assert_eq!(failure["fields"]["code"], "already_archived");
    let msg = failure["fields"]["message"].as_str().unwrap();
    assert!(msg.contains("already exists"), "message: {msg}");
    assert!(msg.contains("seg"), "message: {msg}");
}

#[test]
fn success_is_logged_at_info() {
    let td = tempdir().unwrap();
    let src = td.path().join("seg");
    std::fs::write(&src, b"payload").unwrap();
    let archive = td.path().join("archive");
    std::fs::create_dir_all(&archive).unwrap();

    let mut cfg = ArchiveConfig::default();
    cfg.set_archive_directory(&archive).unwrap();
    let archiver = Archiver::new(&cfg);

    let lines = capture_json("info", || assert!(archiver.archive(&src, "seg")));
    assert!(lines.iter().any(|l| l["level"] == "INFO" && l["fields"]["bytes"] == 7));
    assert!(lines.iter().all(|l| l["level"] != "WARN" && l["level"] != "ERROR"));
}

#[test]
fn failure_is_visible_at_the_quietest_level() {
    let td = tempdir().unwrap();
    let archive = td.path().join("archive");
    std::fs::create_dir_all(&archive).unwrap();

    let mut cfg = ArchiveConfig::default();
    cfg.set_archive_directory(&archive).unwrap();
    let archiver = Archiver::new(&cfg);

    // Quiet maps to an error-only filter.
    let mut ok = true;
    let lines = capture_json("error", || ok = archiver.archive(&td.path().join("absent"), "seg"));
    assert!(!ok);
    assert_eq!(lines.len(), 1, "exactly one diagnostic: {lines:?}");
    assert_eq!(lines[0]["level"], "ERROR");
    assert_eq!(lines[0]["fields"]["code"], "open_error");
}
