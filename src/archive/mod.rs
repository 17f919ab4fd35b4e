//! Archive pipeline: path building, existence guard, stale temp cleanup,
//! streaming copy, durable commit, and the orchestrator sequencing them.

mod cleanup;
mod commit;
mod guard;
mod helpers;
mod io_copy;
pub mod lock;
mod orchestrator;
pub mod paths;

pub use cleanup::remove_stale_temp;
pub use commit::durable_commit;
pub use guard::ensure_not_archived;
pub use helpers::{describe_failure, describe_io_error};
pub use io_copy::{copy_file, CopyResult, COPY_BUF_SIZE};
pub use lock::{acquire_dir_lock, DirLock};
pub use orchestrator::{ArchiveHook, ArchiveReceipt, ArchiveRequest, ArchiveState, Archiver};
pub use paths::{ArchivePaths, MAX_PATH_LEN, TEMP_FILE_NAME};
