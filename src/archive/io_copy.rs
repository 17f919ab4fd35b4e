//! Streaming copy of the source into the temporary file.
//!
//! Features:
//! - The temp file is created with exclusive creation (never truncates or resumes a previous write).
//! - Fixed-size chunks through a caller-provided buffer; memory use is bounded per attempt.
//! - Short writes are failures; with no OS error to report they surface as "out of space".
//! - Both files are closed explicitly on every path, and a failed close fails the copy.
//!
//! Durability is not handled here: the committer syncs the closed temp file before renaming it.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{trace, warn};

use crate::errors::ArchiveError;
use crate::platform::{close_file, out_of_space};

/// Default copy chunk size.
pub const COPY_BUF_SIZE: usize = 64 * 1024;

/// Result of a streaming copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyResult {
    /// Total bytes copied from source to temp.
    pub bytes: u64,
    /// Size of the buffer used for copying.
    pub buf_size: usize,
}

/// Copy `src` into a newly created `dst` using `buf` as the chunk buffer.
pub fn copy_file(src: &Path, dst: &Path, buf: &mut [u8]) -> Result<CopyResult, ArchiveError> {
    let mut src_f = File::open(src).map_err(|e| ArchiveError::Open {
        path: src.to_path_buf(),
        source: e,
    })?;

    let mut dst_f = match open_exclusive(dst) {
        Ok(f) => f,
        Err(e) => {
            log_close_failure(src, &close_file(src_f));
            return Err(ArchiveError::Open {
                path: dst.to_path_buf(),
                source: e,
            });
        }
    };

    let copied = copy_chunks(&mut src_f, &mut dst_f, buf, src, dst);

    let dst_closed = close_file(dst_f);
    let src_closed = close_file(src_f);

    // Only the first failure is returned; the rest are logged.
    let bytes = match copied {
        Ok(bytes) => bytes,
        Err(e) => {
            log_close_failure(dst, &dst_closed);
            log_close_failure(src, &src_closed);
            return Err(e);
        }
    };
    if let Err(e) = dst_closed {
        log_close_failure(src, &src_closed);
        return Err(ArchiveError::Close {
            path: dst.to_path_buf(),
            source: e,
        });
    }
    src_closed.map_err(|e| ArchiveError::Close {
        path: src.to_path_buf(),
        source: e,
    })?;

    trace!(src = %src.display(), dst = %dst.display(), bytes, "copied to temporary file");
    Ok(CopyResult {
        bytes,
        buf_size: buf.len(),
    })
}

/// Log a close failure that is not the error being returned.
fn log_close_failure(path: &Path, closed: &io::Result<()>) -> bool {
    match closed {
        Ok(()) => false,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not close file");
            true
        }
    }
}

fn open_exclusive(path: &Path) -> io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.read(true).write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    opts.open(path)
}

/// Chunk loop: read up to `buf.len()`, write it back out in one call.
/// `src`/`dst` only label errors.
pub(crate) fn copy_chunks<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    buf: &mut [u8],
    src: &Path,
    dst: &Path,
) -> Result<u64, ArchiveError> {
    let mut total: u64 = 0;
    loop {
        let n = match reader.read(buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(ArchiveError::Read {
                    path: src.to_path_buf(),
                    source: e,
                });
            }
        };

        loop {
            match writer.write(&buf[..n]) {
                Ok(written) if written == n => break,
                Ok(written) => {
                    trace!(path = %dst.display(), requested = n, written, "short write");
                    return Err(ArchiveError::Write {
                        path: dst.to_path_buf(),
                        source: out_of_space(),
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    let source = if e.raw_os_error() == Some(0) { out_of_space() } else { e };
                    return Err(ArchiveError::Write {
                        path: dst.to_path_buf(),
                        source,
                    });
                }
            }
        }
        total += n as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn pattern(size: usize) -> Vec<u8> {
        (0..size).map(|i| (i % 251) as u8).collect()
    }

    /// Accepts at most `limit` bytes in total, then reports short writes.
    struct CappedWriter {
        limit: usize,
        written: Vec<u8>,
    }

    impl Write for CappedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.limit - self.written.len();
            let n = room.min(buf.len());
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("media error"))
        }
    }

    #[test]
    fn copy_small_file_ok() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("archtemp");
        fs::write(&src, b"hello world").unwrap();

        let mut buf = vec![0u8; COPY_BUF_SIZE];
        let res = copy_file(&src, &dst, &mut buf).unwrap();
        assert_eq!(res.bytes, 11);
        assert_eq!(res.buf_size, COPY_BUF_SIZE);
        assert_eq!(fs::read(&dst).unwrap(), b"hello world");
    }

    #[test]
    fn chunk_boundaries_are_byte_exact() {
        let dir = tempdir().unwrap();
        let mut buf = vec![0u8; COPY_BUF_SIZE];
        for size in [0, 1, COPY_BUF_SIZE - 1, COPY_BUF_SIZE, COPY_BUF_SIZE + 1, 3 * COPY_BUF_SIZE + 17] {
            let src = dir.path().join(format!("src-{size}"));
            let dst = dir.path().join(format!("dst-{size}"));
            let data = pattern(size);
            fs::write(&src, &data).unwrap();

            let res = copy_file(&src, &dst, &mut buf).unwrap();
            assert_eq!(res.bytes as usize, size);
            assert_eq!(fs::read(&dst).unwrap(), data, "size {size}");
        }
    }

    #[test]
    fn fails_if_temp_exists() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("archtemp");
        fs::write(&src, b"new").unwrap();
        fs::write(&dst, b"old").unwrap();

        let mut buf = vec![0u8; 16];
        let err = copy_file(&src, &dst, &mut buf).unwrap_err();
        match err {
            ArchiveError::Open { path, source } => {
                assert_eq!(path, dst);
                assert_eq!(source.kind(), io::ErrorKind::AlreadyExists);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(fs::read(&dst).unwrap(), b"old", "existing temp must not be truncated");
    }

    #[test]
    fn missing_source_creates_nothing() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("absent");
        let dst = dir.path().join("archtemp");
        let mut buf = vec![0u8; 16];
        let err = copy_file(&src, &dst, &mut buf).unwrap_err();
        assert!(matches!(err, ArchiveError::Open { ref path, .. } if path == &src));
        assert!(!dst.exists());
    }

    #[cfg(unix)]
    #[test]
    fn short_write_reports_out_of_space() {
        let mut reader = Cursor::new(pattern(100));
        let mut writer = CappedWriter { limit: 40, written: Vec::new() };
        let mut buf = vec![0u8; 32];
        let err = copy_chunks(&mut reader, &mut writer, &mut buf, Path::new("src"), Path::new("archtemp"))
            .unwrap_err();
        match err {
            ArchiveError::Write { path, source } => {
                assert_eq!(path, Path::new("archtemp"));
                assert_eq!(source.raw_os_error(), Some(libc::ENOSPC));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(writer.written.len(), 40);
    }

    #[test]
    fn read_error_is_reported_against_source() {
        let mut writer = Vec::new();
        let mut buf = vec![0u8; 32];
        let err = copy_chunks(&mut FailingReader, &mut writer, &mut buf, Path::new("src"), Path::new("archtemp"))
            .unwrap_err();
        assert!(matches!(err, ArchiveError::Read { ref path, .. } if path == Path::new("src")));
        assert!(writer.is_empty());
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn secondary_close_failures_are_logged() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            assert!(!log_close_failure(Path::new("/arch/src-ok"), &Ok(())));
            let failed = Err(io::Error::other("bad descriptor"));
            assert!(log_close_failure(Path::new("/arch/archtemp"), &failed));
        });

        let out = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("could not close file"), "log was: {out}");
        assert!(out.contains("/arch/archtemp") && out.contains("bad descriptor"), "log was: {out}");
        assert!(!out.contains("src-ok"), "log was: {out}");
    }

    #[test]
    fn small_buffer_still_copies_everything() {
        let data = pattern(1000);
        let mut reader = Cursor::new(data.clone());
        let mut writer = Vec::new();
        let mut buf = vec![0u8; 7];
        let n = copy_chunks(&mut reader, &mut writer, &mut buf, Path::new("s"), Path::new("d")).unwrap();
        assert_eq!(n, 1000);
        assert_eq!(writer, data);
    }
}
