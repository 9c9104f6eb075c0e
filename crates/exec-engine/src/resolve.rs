//! Exit resolver: reap the child and turn its wait status into a result.

use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::Pid;
use tracing::debug;

use crate::buffer::CapturedOutput;
use crate::error::{ExecError, Result, SyscallError};
use crate::request::ExecOutput;
use crate::retry::retry_eintr;
use crate::spawn::ChildHandle;

/// How the child terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitResult {
    Success,
    /// Non-zero exit code; signal deaths are reported as `128 + signal`.
    Failure(i32),
}

impl ExitResult {
    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            ExitResult::Success
        } else {
            ExitResult::Failure(code)
        }
    }

    pub fn code(self) -> i32 {
        match self {
            ExitResult::Success => 0,
            ExitResult::Failure(code) => code,
        }
    }

    pub fn is_success(self) -> bool {
        self == ExitResult::Success
    }
}

/// Block until `pid` terminates, retrying on `EINTR`.
pub fn wait_for_exit(pid: Pid) -> std::result::Result<ExitResult, SyscallError> {
    loop {
        let status = retry_eintr(|| waitpid(pid, None))
            .map_err(|errno| SyscallError::new("wait", errno))?;
        match status {
            WaitStatus::Exited(_, code) => return Ok(ExitResult::from_code(code)),
            WaitStatus::Signaled(_, signal, _) => {
                return Ok(ExitResult::Failure(128 + signal as i32));
            }
            // Stop/continue notifications are not terminal; keep waiting.
            _ => continue,
        }
    }
}

/// Reap `child` and hand back whatever was captured, if the command succeeded.
///
/// The captured buffer is dropped on every failure path; callers never see
/// partial output from a failed command.
pub fn finalize(child: ChildHandle, captured: Option<CapturedOutput>) -> Result<ExecOutput> {
    let pid = child.pid();
    // Closes any read end the caller did not take.
    drop(child);

    let exit = wait_for_exit(pid)?;
    debug!(
        pid = %pid,
        code = exit.code(),
        captured_len = captured.as_ref().map(CapturedOutput::len),
        "child exited"
    );

    match exit {
        ExitResult::Failure(code) => Err(ExecError::Failed { code }),
        ExitResult::Success => Ok(match captured {
            Some(output) => ExecOutput::Captured(output),
            None => ExecOutput::Inherited,
        }),
    }
}
