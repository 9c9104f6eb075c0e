//! Whole-file read and write.

use std::ffi::CString;
use std::fs::File;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use exec_engine::retry::retry_libc;
use exec_engine::{Errno, drain};
use tracing::debug;

use crate::error::{FsError, Result};

/// Mode for files created by [`write_file`].
const CREATE_MODE: libc::c_uint = 0o755;

fn c_path(path: &Path) -> Result<CString> {
    CString::new(path.as_os_str().as_bytes()).map_err(|_| FsError::InvalidPath {
        path: path.to_path_buf(),
    })
}

fn open(path: &Path, flags: libc::c_int) -> Result<OwnedFd> {
    let cpath = c_path(path)?;
    // SAFETY: cpath is a valid C string; mode is only read when O_CREAT is set.
    let fd = retry_libc(|| unsafe {
        libc::open(cpath.as_ptr(), flags | libc::O_CLOEXEC, CREATE_MODE)
    })
    .map_err(|errno| FsError::syscall(path, "open", errno))?;
    // SAFETY: open returned a fresh descriptor that nothing else owns.
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

/// Read the whole file at `path`.
///
/// The buffer is sized from `fstat` up front (plus one byte so EOF is seen
/// without growing), but files that change size while being read are still
/// read to the end.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    let file = match open(path, libc::O_RDONLY) {
        Ok(fd) => File::from(fd),
        Err(FsError::Syscall { source, .. }) if source.errno == Errno::ENOENT => {
            return Err(FsError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(e),
    };

    let size = file
        .metadata()
        .map_err(|e| FsError::io("fstat", path, e))?
        .len();
    let suggested = usize::try_from(size).unwrap_or(0).saturating_add(1);

    let content = drain(file.as_fd(), suggested).map_err(|source| FsError::Syscall {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), len = content.len(), "read_file");
    Ok(content.into_vec())
}

/// Create or truncate `path` and write `content` to it.
pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    let fd = open(path, libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC)?;
    write_all(fd.as_fd(), content).map_err(|errno| FsError::syscall(path, "write", errno))?;
    debug!(path = %path.display(), len = content.len(), "write_file");
    Ok(())
}

fn write_all(fd: BorrowedFd<'_>, mut content: &[u8]) -> std::result::Result<(), Errno> {
    while !content.is_empty() {
        // SAFETY: content is a valid readable region of content.len() bytes.
        let n = retry_libc(|| unsafe {
            libc::write(fd.as_raw_fd(), content.as_ptr().cast(), content.len())
        })?
        .unsigned_abs();
        if n == 0 {
            return Err(Errno::EIO);
        }
        content = content.get(n..).unwrap_or_default();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use exec_engine::READ_BLOCK;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        write_file(&path, b"hello\n").unwrap();
        assert_eq!(read_file(&path).unwrap(), b"hello\n");
    }

    #[test]
    fn write_truncates_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        write_file(&path, b"a much longer first version").unwrap();
        write_file(&path, b"short").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"short");
    }

    #[test]
    fn created_files_are_executable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.sh");

        write_file(&path, b"#!/bin/sh\n").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_ne!(mode & 0o100, 0, "mode was {mode:o}");
    }

    #[test]
    fn read_large_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let content: Vec<u8> = (0..(2 * READ_BLOCK + 5)).map(|i| (i % 253) as u8).collect();
        std::fs::write(&path, &content).unwrap();

        assert_eq!(read_file(&path).unwrap(), content);
    }

    #[test]
    fn read_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, b"").unwrap();

        assert!(read_file(&path).unwrap().is_empty());
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_file(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, FsError::NotFound { .. }), "got {err:?}");
    }

    #[test]
    fn read_directory_is_syscall_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_file(dir.path()).unwrap_err();
        match err {
            FsError::Syscall { source, .. } => assert_eq!(source.errno, Errno::EISDIR),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_file(&dir.path().join("no/such/dir/file"), b"x").unwrap_err();
        match err {
            FsError::Syscall { source, .. } => {
                assert_eq!(source.operation, "open");
                assert_eq!(source.errno, Errno::ENOENT);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn nul_in_path_is_rejected() {
        let err = read_file(Path::new("bad\0path")).unwrap_err();
        assert!(matches!(err, FsError::InvalidPath { .. }));
    }
}
