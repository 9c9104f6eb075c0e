use std::os::fd::AsFd;

use tracing::{trace, warn};

use crate::buffer::READ_BLOCK;
use crate::collect::drain;
use crate::error::Result;
use crate::request::{ExecOutput, ExecutionRequest};
use crate::resolve::{finalize, wait_for_exit};
use crate::spawn::spawn;

/// Run `request` to completion: spawn, drain stdout if captured, then wait.
///
/// Blocks until the child has exited. Output is returned only when the
/// command exits with code 0.
pub fn execute(request: &ExecutionRequest) -> Result<ExecOutput> {
    let mut child = spawn(request)?;

    let captured = match child.take_output() {
        Some(read_end) => {
            let drained = drain(read_end.as_fd(), READ_BLOCK);
            drop(read_end);
            match drained {
                Ok(output) => Some(output),
                Err(err) => {
                    // Still reap the child so a failed drain leaves no zombie.
                    if let Err(wait_err) = wait_for_exit(child.pid()) {
                        warn!(pid = %child.pid(), error = %wait_err, "reap after failed drain");
                    }
                    return Err(err.into());
                }
            }
        }
        None => None,
    };

    trace!(pid = %child.pid(), "output collected, waiting");
    finalize(child, captured)
}
