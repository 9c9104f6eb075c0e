use std::path::PathBuf;

use exec_engine::SyscallError;

#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("no such file: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("{}: {source}", .path.display())]
    Syscall {
        path: PathBuf,
        #[source]
        source: SyscallError,
    },

    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid path {}: contains an interior NUL byte", .path.display())]
    InvalidPath { path: PathBuf },
}

impl FsError {
    pub(crate) fn syscall(
        path: &std::path::Path,
        operation: &'static str,
        errno: exec_engine::Errno,
    ) -> Self {
        FsError::Syscall {
            path: path.to_path_buf(),
            source: SyscallError::new(operation, errno),
        }
    }

    pub(crate) fn io(op: &'static str, path: &std::path::Path, source: std::io::Error) -> Self {
        FsError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FsError>;
