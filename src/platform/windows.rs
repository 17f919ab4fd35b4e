//! Windows implementations of platform helpers (best-effort).
//!
//! Notes:
//! - Windows lacks POSIX mode semantics; we do not attempt ACL management here.
//! - Directory handles cannot be fsynced through std; rename durability relies on NTFS journaling.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// Open log file for appending (best-effort; no symlink defense available via std on Windows).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// CloseHandle failures are not observable through std; dropping is all we can do.
pub fn close_file(file: File) -> io::Result<()> {
    drop(file);
    Ok(())
}

/// ERROR_DISK_FULL
pub fn out_of_space() -> io::Error {
    io::Error::from_raw_os_error(112)
}

pub fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
