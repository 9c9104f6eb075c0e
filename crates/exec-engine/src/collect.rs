//! Output collector: drain a descriptor to end-of-stream into a [`GrowBuffer`].

use std::os::fd::{AsRawFd, BorrowedFd};

use nix::errno::Errno;
use tracing::trace;

use crate::buffer::{CapturedOutput, GrowBuffer};
use crate::error::SyscallError;
use crate::retry::retry_eintr;

/// Read `fd` until a zero-length read, starting from `suggested_size` bytes
/// (one block if zero) and growing one block at a time.
///
/// On error the partial buffer is dropped; nothing read so far is returned.
pub fn drain(fd: BorrowedFd<'_>, suggested_size: usize) -> Result<CapturedOutput, SyscallError> {
    let mut buf = GrowBuffer::new(suggested_size).map_err(|_| out_of_memory())?;

    loop {
        let n = retry_eintr(|| read_into(fd, buf.spare_mut()))
            .map_err(|errno| SyscallError::new("read", errno))?;
        if n == 0 {
            break;
        }
        buf.advance(n);
        if buf.is_full() {
            buf.grow().map_err(|_| out_of_memory())?;
            trace!(size = buf.size(), "read buffer grown");
        }
    }

    trace!(fd = fd.as_raw_fd(), len = buf.len(), "drained");
    Ok(buf.into_output())
}

fn read_into(fd: BorrowedFd<'_>, spare: &mut [u8]) -> Result<usize, Errno> {
    // SAFETY: spare is a valid, writable region of spare.len() bytes.
    let n = Errno::result(unsafe {
        libc::read(fd.as_raw_fd(), spare.as_mut_ptr().cast(), spare.len())
    })?;
    Ok(n.unsigned_abs())
}

fn out_of_memory() -> SyscallError {
    SyscallError::new("realloc", Errno::ENOMEM)
}
