//! Process spawner: channel creation, fork, and child-side stdio/cwd setup
//! ending in `exec /bin/sh -c <command>`.

use std::borrow::Cow;
use std::ffi::{CStr, CString};
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;

use nix::errno::Errno;
use nix::sys::socket::{AddressFamily, SockFlag, SockType, socketpair};
use nix::unistd::{ForkResult, Pid, fork};
use tracing::debug;

use crate::error::{ExecError, Result, SyscallError};
use crate::request::{ExecutionRequest, StdioMode};
use crate::retry::{retry_eintr, retry_libc};

const SHELL: &CStr = c"/bin/sh";
const SHELL_COMMAND_FLAG: &CStr = c"-c";
const NULL_DEVICE: &CStr = c"/dev/null";

/// Exit status of a child whose redirection, chdir, or exec failed.
pub const CHILD_SETUP_FAILED: i32 = 127;

/// Maximum length for command preview in logs
const COMMAND_PREVIEW_MAX_LEN: usize = 100;

/// A running (or already exited) child, owned by the caller until it is
/// handed to [`crate::finalize`].
#[derive(Debug)]
pub struct ChildHandle {
    pid: Pid,
    output: Option<OwnedFd>,
}

impl ChildHandle {
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Take the read end of the stdout channel. `None` in inherited mode or
    /// once taken.
    pub fn take_output(&mut self) -> Option<OwnedFd> {
        self.output.take()
    }
}

/// Raw channel descriptors as the child sees them right after fork.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChildChannel {
    read: RawFd,
    write: RawFd,
}

/// Everything the child needs between fork and exec, prepared up front so the
/// child never allocates.
///
/// Only async-signal-safe libc calls are made from [`ChildSetup::run`]; any
/// failure ends the child with [`CHILD_SETUP_FAILED`].
#[derive(Debug)]
pub(crate) struct ChildSetup {
    command: CString,
    cwd: Option<CString>,
}

impl ChildSetup {
    pub(crate) fn new(request: &ExecutionRequest) -> Result<Self> {
        let command = CString::new(request.command()).map_err(|source| {
            ExecError::InvalidArgument {
                what: "command",
                source,
            }
        })?;
        let cwd = request
            .working_dir()
            .map(|dir| CString::new(dir.as_os_str().as_bytes()))
            .transpose()
            .map_err(|source| ExecError::InvalidArgument {
                what: "working directory",
                source,
            })?;
        Ok(Self { command, cwd })
    }

    /// Point stdout at the channel and stdin/stderr at the null device.
    fn redirect(&self, channel: ChildChannel) -> std::result::Result<(), Errno> {
        // stdout first: if the caller had closed one of its standard streams the
        // channel may sit on fd 0 or 2 and would be clobbered by the null device.
        dup_onto(channel.write, libc::STDOUT_FILENO)?;

        // SAFETY: NULL_DEVICE is a NUL-terminated static path.
        let null = retry_libc(|| unsafe { libc::open(NULL_DEVICE.as_ptr(), libc::O_RDWR) })?;
        dup_onto(null, libc::STDIN_FILENO)?;
        dup_onto(null, libc::STDERR_FILENO)?;

        close_redundant(null);
        close_redundant(channel.write);
        close_redundant(channel.read);
        Ok(())
    }

    fn enter_cwd(&self) -> std::result::Result<(), Errno> {
        if let Some(dir) = &self.cwd {
            // SAFETY: dir is a valid C string owned by self.
            retry_libc(|| unsafe { libc::chdir(dir.as_ptr()) })?;
        }
        Ok(())
    }

    /// Replace the process image. Only returns on failure.
    fn exec(&self) {
        let argv: [*const libc::c_char; 4] = [
            SHELL.as_ptr(),
            SHELL_COMMAND_FLAG.as_ptr(),
            self.command.as_ptr(),
            std::ptr::null(),
        ];
        // SAFETY: argv is NULL-terminated and every pointer outlives the call.
        unsafe { libc::execv(SHELL.as_ptr(), argv.as_ptr()) };
    }

    /// Child-side entry point after fork. Never returns.
    pub(crate) fn run(&self, channel: Option<ChildChannel>) -> ! {
        let prepared = match channel {
            Some(channel) => self.redirect(channel),
            None => Ok(()),
        }
        .and_then(|()| self.enter_cwd());

        if prepared.is_ok() {
            self.exec();
        }

        // SAFETY: _exit is async-signal-safe and skips the parent's atexit
        // handlers and buffered stdio, which the child must not run.
        unsafe { libc::_exit(CHILD_SETUP_FAILED) }
    }
}

/// Make `target` refer to `fd` and survive exec.
///
/// `dup2(fd, fd)` is a no-op that leaves `FD_CLOEXEC` set, so a channel that
/// already sits on its target only has the flag cleared.
fn dup_onto(fd: RawFd, target: RawFd) -> std::result::Result<(), Errno> {
    if fd == target {
        // SAFETY: F_SETFD with 0 only clears descriptor flags on fd.
        return retry_libc(|| unsafe { libc::fcntl(fd, libc::F_SETFD, 0) }).map(drop);
    }
    // SAFETY: dup2 on arbitrary descriptors is memory-safe; errors are returned.
    retry_libc(|| unsafe { libc::dup2(fd, target) }).map(drop)
}

fn close_redundant(fd: RawFd) {
    if fd > libc::STDERR_FILENO {
        // SAFETY: fd was inherited across fork and is not referenced again.
        unsafe { libc::close(fd) };
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn channel_flags() -> SockFlag {
    SockFlag::SOCK_CLOEXEC
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn channel_flags() -> SockFlag {
    SockFlag::empty()
}

/// Connected UNIX stream pair: `(read end, write end)`.
fn open_channel() -> std::result::Result<(OwnedFd, OwnedFd), SyscallError> {
    retry_eintr(|| socketpair(AddressFamily::Unix, SockType::Stream, None, channel_flags()))
        .map_err(|errno| SyscallError::new("channel-create", errno))
}

/// Start `sh -c <command>` as configured by `request`.
///
/// In captured mode the returned handle carries the read end of the stdout
/// channel; the parent's copy of the write end is already closed.
pub fn spawn(request: &ExecutionRequest) -> Result<ChildHandle> {
    let setup = ChildSetup::new(request)?;

    let channel = match request.stdio_mode() {
        StdioMode::Captured => Some(open_channel()?),
        StdioMode::Inherited => None,
    };
    let child_channel = channel.as_ref().map(|(read, write)| ChildChannel {
        read: read.as_raw_fd(),
        write: write.as_raw_fd(),
    });

    // SAFETY: the child branch runs only ChildSetup::run, which makes
    // async-signal-safe syscalls on pre-built C strings before exec or _exit.
    match unsafe { fork() } {
        Ok(ForkResult::Child) => setup.run(child_channel),
        Ok(ForkResult::Parent { child }) => {
            let output = channel.map(|(read, write)| {
                drop(write);
                read
            });
            debug!(
                pid = %child,
                command = %command_preview(request.command()),
                captured = output.is_some(),
                "spawned"
            );
            Ok(ChildHandle { pid: child, output })
        }
        Err(errno) => Err(SyscallError::new("fork", errno).into()),
    }
}

/// At most [`COMMAND_PREVIEW_MAX_LEN`] bytes of `command`, cut back to a char
/// boundary, with `...` appended when anything was dropped.
fn command_preview(command: &str) -> Cow<'_, str> {
    if command.len() <= COMMAND_PREVIEW_MAX_LEN {
        return Cow::Borrowed(command);
    }
    let mut end = COMMAND_PREVIEW_MAX_LEN;
    while !command.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(format!("{}...", command.get(..end).unwrap_or_default()))
}
