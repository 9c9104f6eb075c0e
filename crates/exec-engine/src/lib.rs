//! Synchronous shell-command execution.
//!
//! [`execute`] forks, runs the command under `/bin/sh -c`, optionally drains
//! its stdout into memory, and waits for it:
//!
//! 1. [`spawn`] creates the stdout channel (captured mode only), forks, and
//!    sets up stdio and the working directory in the child before `exec`.
//! 2. [`drain`] reads the channel to end-of-stream into a [`GrowBuffer`].
//! 3. [`finalize`] reaps the child and maps its status to success or
//!    [`ExecError::Failed`].
//!
//! Hosts must call [`signal::ignore_broken_pipe`] once before the first call.

#![cfg(unix)]

mod buffer;
mod collect;
mod error;
mod execute;
mod request;
mod resolve;
pub mod retry;
pub mod signal;
mod spawn;

pub use buffer::{CapturedOutput, GrowBuffer, READ_BLOCK};
pub use collect::drain;
pub use error::{ExecError, Result, SyscallError};
pub use execute::execute;
pub use request::{ExecOutput, ExecutionRequest, StdioMode};
pub use resolve::{ExitResult, finalize, wait_for_exit};
pub use spawn::{CHILD_SETUP_FAILED, ChildHandle, spawn};

pub use nix::errno::Errno;
pub use nix::unistd::Pid;
