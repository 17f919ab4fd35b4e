//! Optional advisory lock serialising archivers on one archive directory.
//!
//! Design:
//! - We lock by opening/holding `.archtemp.lock` inside the archive directory.
//! - Unix: flock(LOCK_EX) on the file descriptor (blocks until acquired).
//! - Windows: open the file without sharing (exclusive); retry on sharing violations.
//!
//! The lock is released, and the lock file removed, when the DirLock guard is dropped.
//! Without it the shared temp name assumes a single archiver per directory.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::trace;

#[cfg(unix)]
use std::fs::OpenOptions;
#[cfg(unix)]
use std::os::fd::AsRawFd;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// Name of the sidecar lock file.
pub const LOCK_FILE_NAME: &str = ".archtemp.lock";

/// RAII guard held while the directory lock is active.
pub struct DirLock {
    file: Option<File>,
    path: PathBuf,
}

impl DirLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        // Unlink before unlocking; waiters re-check the inode after flock returns.
        let _ = std::fs::remove_file(&self.path);
        #[cfg(unix)]
        if let Some(f) = &self.file {
            // SAFETY: the descriptor is owned by `f` and still open.
            let _ = unsafe { libc::flock(f.as_raw_fd(), libc::LOCK_UN) };
        }
        drop(self.file.take());
    }
}

fn lock_file_path(dir: &Path) -> PathBuf {
    dir.join(LOCK_FILE_NAME)
}

/// Blocking acquire of the lock for `dir`.
pub fn acquire_dir_lock(dir: &Path) -> io::Result<DirLock> {
    let lock_path = lock_file_path(dir);
    let start = Instant::now();

    #[cfg(unix)]
    {
        loop {
            let f = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .custom_flags(libc::O_CLOEXEC)
                .mode(0o600)
                .open(&lock_path)?;

            // SAFETY: plain flock on a descriptor we own.
            let rc = unsafe { libc::flock(f.as_raw_fd(), libc::LOCK_EX) };
            if rc != 0 {
                return Err(io::Error::last_os_error());
            }

            // The previous holder unlinks the file on release; if our inode is no
            // longer the one at `lock_path`, start over on the new file.
            if !same_inode(&f, &lock_path) {
                trace!(path = %lock_path.display(), "lock file replaced while waiting; retrying");
                continue;
            }

            trace!(
                path = %lock_path.display(),
                waited_ms = start.elapsed().as_millis() as u64,
                "directory lock acquired"
            );
            return Ok(DirLock { file: Some(f), path: lock_path });
        }
    }

    #[cfg(windows)]
    {
        use std::iter::once;
        use std::os::windows::ffi::OsStrExt;
        use std::os::windows::io::FromRawHandle;
        use std::thread::sleep;
        use std::time::Duration;
        use tracing::warn;
        use windows_sys::Win32::Foundation::{GENERIC_READ, GENERIC_WRITE, INVALID_HANDLE_VALUE};
        use windows_sys::Win32::Storage::FileSystem::{
            CreateFileW, FILE_ATTRIBUTE_HIDDEN, OPEN_ALWAYS,
        };

        let wide: Vec<u16> = lock_path.as_os_str().encode_wide().chain(once(0)).collect();
        let mut attempts: u32 = 0;
        loop {
            // SAFETY: `wide` is null-terminated and outlives the call.
            let handle = unsafe {
                CreateFileW(
                    wide.as_ptr(),
                    GENERIC_READ | GENERIC_WRITE,
                    0, // no sharing => exclusive
                    std::ptr::null(),
                    OPEN_ALWAYS,
                    FILE_ATTRIBUTE_HIDDEN,
                    std::ptr::null_mut(),
                )
            };

            if handle != INVALID_HANDLE_VALUE {
                trace!(path = %lock_path.display(), attempts, waited_ms = start.elapsed().as_millis() as u64, "directory lock acquired");
                // SAFETY: `handle` is a fresh, owned file handle.
                let file = unsafe { File::from_raw_handle(handle as _) };
                return Ok(DirLock { file: Some(file), path: lock_path });
            }

            let err = io::Error::last_os_error();
            // ERROR_SHARING_VIOLATION => held elsewhere, retry
            if err.raw_os_error() == Some(32) {
                attempts += 1;
                if attempts % 10 == 0 {
                    warn!(path = %lock_path.display(), attempts, "still waiting for archive directory lock");
                }
                sleep(Duration::from_millis(50));
                continue;
            }
            return Err(err);
        }
    }
}

#[cfg(unix)]
fn same_inode(f: &File, path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (f.metadata(), std::fs::metadata(path)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}
