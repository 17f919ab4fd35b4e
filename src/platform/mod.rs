//! Platform-specific helpers.
//! This module hides OS differences (Unix/Windows) behind a uniform API so
//! the archive pipeline can remain platform-agnostic.

#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{close_file, fsync_dir, open_log_file_secure_append, out_of_space};

#[cfg(not(unix))]
pub use windows::{close_file, fsync_dir, open_log_file_secure_append, out_of_space};
