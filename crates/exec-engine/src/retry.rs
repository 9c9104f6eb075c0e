//! EINTR handling shared by every blocking syscall in the engine.
//!
//! A syscall that fails only because a signal arrived mid-call is re-issued;
//! interruption is never surfaced as an error.

use nix::errno::Errno;

/// Re-run `op` until it returns anything other than `EINTR`.
pub fn retry_eintr<T>(mut op: impl FnMut() -> Result<T, Errno>) -> Result<T, Errno> {
    loop {
        match op() {
            Err(Errno::EINTR) => continue,
            other => return other,
        }
    }
}

/// Like [`retry_eintr`] for raw libc calls that report failure as `-1` + errno.
pub fn retry_libc<T>(mut op: impl FnMut() -> T) -> Result<T, Errno>
where
    T: nix::errno::ErrnoSentinel + PartialEq<T>,
{
    retry_eintr(|| Errno::result(op()))
}
