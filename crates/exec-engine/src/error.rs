use nix::errno::Errno;

/// An OS primitive failed while the engine was driving a child process.
///
/// Distinct from [`ExecError::Failed`]: here the engine itself could not do
/// its job, whereas a non-zero exit means the command ran and failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{operation} failure: {errno}")]
pub struct SyscallError {
    pub operation: &'static str,
    pub errno: Errno,
}

impl SyscallError {
    pub fn new(operation: &'static str, errno: Errno) -> Self {
        Self { operation, errno }
    }

    /// Raw platform error code.
    pub fn code(&self) -> i32 {
        self.errno as i32
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error(transparent)]
    Syscall(#[from] SyscallError),

    #[error("command exited with non-zero code {code}")]
    Failed { code: i32 },

    #[error("invalid {what}: contains an interior NUL byte")]
    InvalidArgument {
        what: &'static str,
        #[source]
        source: std::ffi::NulError,
    },
}

pub type Result<T> = std::result::Result<T, ExecError>;
