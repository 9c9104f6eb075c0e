//! Process-wide signal disposition required before the first execution.
//!
//! With SIGPIPE at its default disposition, writing to a child that has
//! closed its end of a pipe kills the caller. Ignoring it turns that into an
//! `EPIPE` error on the write instead.

use std::sync::OnceLock;

use nix::errno::Errno;
use tracing::debug;

use crate::error::SyscallError;

static BROKEN_PIPE_IGNORED: OnceLock<Result<(), SyscallError>> = OnceLock::new();

/// Install `SIG_IGN` for `sig` via `sigaction`.
fn ignore(sig: libc::c_int) -> Result<(), Errno> {
    // SAFETY: zeroed sigaction is valid; we fill sa_sigaction and leave the mask empty.
    let mut sa: libc::sigaction = unsafe { std::mem::zeroed() };
    sa.sa_sigaction = libc::SIG_IGN;
    // SAFETY: sa is properly initialized, sig is a valid signal number.
    Errno::result(unsafe { libc::sigaction(sig, &sa, std::ptr::null_mut()) }).map(drop)
}

/// Ignore SIGPIPE for the whole process.
///
/// Call once from the host before the first [`crate::execute`]. Later calls
/// return the first call's outcome without touching the disposition again.
pub fn ignore_broken_pipe() -> Result<(), SyscallError> {
    *BROKEN_PIPE_IGNORED.get_or_init(|| {
        let result =
            ignore(libc::SIGPIPE).map_err(|errno| SyscallError::new("sigaction", errno));
        debug!(ok = result.is_ok(), "SIGPIPE disposition set to ignore");
        result
    })
}

/// Whether SIGPIPE is currently ignored in this process.
pub fn broken_pipe_ignored() -> Result<bool, SyscallError> {
    // SAFETY: zeroed sigaction is a valid out-parameter.
    let mut current: libc::sigaction = unsafe { std::mem::zeroed() };
    // SAFETY: a null new-action pointer only queries the disposition.
    Errno::result(unsafe { libc::sigaction(libc::SIGPIPE, std::ptr::null(), &mut current) })
        .map_err(|errno| SyscallError::new("sigaction", errno))?;
    Ok(current.sa_sigaction == libc::SIG_IGN)
}
