use std::path::{Path, PathBuf};

use exec_engine::Errno;
use exec_engine::retry::retry_eintr;

use crate::error::{FsError, Result};

/// Whether anything (including a dangling symlink) exists at `path`.
///
/// Only `ENOENT` means "no"; other lookup failures are errors.
pub fn exists(path: &Path) -> Result<bool> {
    match retry_eintr(|| nix::sys::stat::lstat(path)) {
        Ok(_) => Ok(true),
        Err(Errno::ENOENT) => Ok(false),
        Err(errno) => Err(FsError::syscall(path, "lstat", errno)),
    }
}

/// Absolute path with symlinks, `.` and `..` resolved.
pub fn realpath(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path).map_err(|e| FsError::io("realpath", path, e))
}

/// The process's current working directory.
pub fn cwd() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| FsError::io("getcwd", Path::new("."), e))
}
