//! Diagnostic helpers.
//!
//! Turns an `ArchiveError` (or a bare io::Error) into the one-line diagnostic
//! emitted for a failed attempt, appending platform-aware hints keyed on the
//! raw OS error code.
//!
//! Usage:
//!   error!("{}", describe_failure(&err));

use std::io;
use std::path::Path;

use crate::errors::ArchiveError;

/// Short hint for well-known OS errors; None when nothing useful applies.
fn hint_for(e: &io::Error) -> Option<&'static str> {
    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        let hint = match code {
            libc::EACCES | libc::EPERM => {
                Some("permission denied; check ownership and write permissions.")
            }
            libc::EXDEV => Some("cross-filesystem; atomic rename not possible."),
            libc::EBUSY => Some("resource busy; ensure no other process is writing."),
            libc::ENOENT => Some("path not found; verify it exists."),
            libc::EEXIST => Some("already exists; another archiver may be running against this directory."),
            libc::ENOSPC => Some("insufficient space on device."),
            libc::EFBIG => Some("file too large for this process or filesystem."),
            libc::EROFS => Some("read-only filesystem; cannot write here."),
            libc::EIO => Some("low-level I/O error; check the device."),
            libc::ELOOP => Some("too many symbolic link levels (ELOOP); possible symlink cycle."),
            libc::ENAMETOOLONG => Some("filename or path too long; shorten path segments."),
            libc::EMFILE => Some("process file descriptor limit reached; close files or raise limits."),
            libc::ENFILE => Some("system-wide file table overflow; reduce open files."),
            _ => None,
        };
        #[cfg(windows)]
        let hint = match code {
            5 => Some("access denied; check permissions."),
            17 => Some("not same device; atomic rename not possible."),
            32 => Some("sharing violation; file is in use."),
            2 | 3 => Some("path not found; verify it exists."),
            80 | 183 => Some("already exists; another archiver may be running against this directory."),
            112 => Some("insufficient disk space."),
            19 => Some("write protected / read-only media."),
            206 => Some("filename or path too long (MAX_PATH exceeded)."),
            4 => Some("too many open files; close handles or increase limit."),
            _ => None,
        };
        #[cfg(not(any(unix, windows)))]
        let hint = {
            let _ = code;
            None
        };
        if hint.is_some() {
            return hint;
        }
    }

    match e.kind() {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and write permissions."),
        io::ErrorKind::NotFound => Some("path not found; verify it exists."),
        io::ErrorKind::AlreadyExists => Some("already exists; another archiver may be running against this directory."),
        io::ErrorKind::WriteZero => Some("device accepted no bytes; likely out of space."),
        _ => None,
    }
}

/// Format "<op> '<path>': <error> - <hint> [os code: N]".
pub fn describe_io_error(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);
    if let Some(hint) = hint_for(e) {
        msg.push_str(" - ");
        msg.push_str(hint);
    }
    if let Some(code) = e.raw_os_error() {
        msg.push_str(&format!(" [os code: {}]", code));
    }
    msg
}

/// Full diagnostic for a failed attempt: the error message plus a hint, when one applies.
pub fn describe_failure(err: &ArchiveError) -> String {
    let mut msg = err.to_string();
    if let Some(source) = err.io_source() {
        if let Some(hint) = hint_for(source) {
            msg.push_str(" - ");
            msg.push_str(hint);
        }
        if let Some(code) = source.raw_os_error() {
            msg.push_str(&format!(" [os code: {}]", code));
        }
    }
    msg
}
