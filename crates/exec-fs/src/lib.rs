//! Filesystem helpers exposed to scripting hosts alongside command execution.
//!
//! Blocking syscalls are retried on `EINTR` with the same utility the
//! execution engine uses, and whole-file reads go through its growable buffer.

#![cfg(unix)]

mod dir;
mod error;
mod file;
mod path;

pub use dir::{mkdirp, read_dir};
pub use error::{FsError, Result};
pub use file::{read_file, write_file};
pub use path::{cwd, exists, realpath};
