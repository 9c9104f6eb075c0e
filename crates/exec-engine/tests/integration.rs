#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::unreachable
)]

use exec_engine::{
    CHILD_SETUP_FAILED, ExecError, ExecOutput, ExecutionRequest, READ_BLOCK, StdioMode, execute,
};

fn captured(cmd: &str) -> Vec<u8> {
    execute(&ExecutionRequest::new(cmd))
        .unwrap()
        .into_captured()
        .expect("captured mode returns bytes")
        .into_vec()
}

// =========================================================================
// Captured output
// =========================================================================

#[test]
fn echo_hi_returns_exact_bytes() {
    assert_eq!(captured("echo hi"), b"hi\n");
}

#[test]
fn output_larger_than_block_is_byte_exact() {
    let n = 3 * READ_BLOCK + 17;
    let out = captured(&format!("head -c {n} /dev/zero | tr '\\0' 'a'"));
    assert_eq!(out.len(), n);
    assert!(out.iter().all(|&b| b == b'a'));
}

#[test]
fn varied_content_survives_buffer_growth() {
    let out = captured("seq 1 40000");
    let expected: String = (1..=40000).map(|i| format!("{i}\n")).collect();
    assert!(expected.len() > READ_BLOCK);
    assert_eq!(out, expected.into_bytes());
}

#[test]
fn stderr_is_not_captured() {
    assert_eq!(captured("echo out; echo err >&2"), b"out\n");
}

#[test]
fn stdin_reads_null_device() {
    assert_eq!(captured("cat"), b"");
}

#[test]
fn shell_metacharacters_are_interpreted() {
    assert_eq!(captured("echo a | tr a b && echo c"), b"b\nc\n");
    assert_eq!(captured("false || echo fallback"), b"fallback\n");
}

#[test]
fn binary_output_is_opaque() {
    assert_eq!(captured("printf '\\000\\377\\001'"), vec![0u8, 0xff, 1]);
}

#[test]
fn working_directory_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let out = execute(&ExecutionRequest::new("pwd -P").cwd(dir.path()))
        .unwrap()
        .into_captured()
        .unwrap();
    let expected = format!("{}\n", dir.path().canonicalize().unwrap().display());
    assert_eq!(out.as_bytes(), expected.as_bytes());
}

#[test]
fn repeated_runs_are_identical() {
    let first = captured("printf 'stable output'");
    for _ in 0..10 {
        assert_eq!(captured("printf 'stable output'"), first);
    }
}

// =========================================================================
// Failures
// =========================================================================

#[test]
fn exit_one_is_execution_failure_without_output() {
    let err = execute(&ExecutionRequest::new("echo lost; exit 1")).unwrap_err();
    assert!(matches!(err, ExecError::Failed { code: 1 }), "got {err:?}");
}

#[test]
fn missing_working_directory_fails() {
    let req = ExecutionRequest::new("echo unreachable").cwd("/nonexistent/exec-engine/cwd");
    let err = execute(&req).unwrap_err();
    assert!(
        matches!(err, ExecError::Failed { code } if code == CHILD_SETUP_FAILED),
        "got {err:?}"
    );
}

#[test]
fn missing_working_directory_fails_in_inherited_mode() {
    let req = ExecutionRequest::new("true")
        .cwd("/nonexistent/exec-engine/cwd")
        .stdio(StdioMode::Inherited);
    assert!(matches!(execute(&req), Err(ExecError::Failed { .. })));
}

#[test]
fn signal_death_is_failure() {
    let err = execute(&ExecutionRequest::new("kill -TERM $$")).unwrap_err();
    assert!(
        matches!(err, ExecError::Failed { code } if code == 128 + libc::SIGTERM),
        "got {err:?}"
    );
}

// =========================================================================
// Inherited stdio
// =========================================================================

#[test]
fn inherited_mode_never_returns_bytes() {
    let req = ExecutionRequest::new("echo inherited-mode-output").stdio(StdioMode::Inherited);
    assert_eq!(execute(&req).unwrap(), ExecOutput::Inherited);
}

// =========================================================================
// Signal interruption
// =========================================================================

#[cfg(target_os = "linux")]
mod interrupted {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    static DELIVERED: AtomicUsize = AtomicUsize::new(0);

    extern "C" fn count_signal(_sig: libc::c_int) {
        DELIVERED.fetch_add(1, Ordering::SeqCst);
    }

    /// Handler without SA_RESTART so blocking syscalls fail with EINTR.
    fn install_interrupting_handler() {
        let mut sa: libc::sigaction = unsafe { std::mem::zeroed() };
        sa.sa_sigaction = count_signal as *const () as libc::sighandler_t;
        sa.sa_flags = 0;
        unsafe {
            libc::sigaction(libc::SIGUSR1, &sa, std::ptr::null_mut());
        }
    }

    #[test]
    fn interrupted_read_and_wait_are_retried() {
        install_interrupting_handler();

        let target = unsafe { libc::pthread_self() };
        let done = Arc::new(AtomicBool::new(false));
        let pelter = {
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::SeqCst) {
                    unsafe {
                        libc::pthread_kill(target, libc::SIGUSR1);
                    }
                    thread::sleep(Duration::from_millis(5));
                }
            })
        };

        let result = execute(&ExecutionRequest::new("sleep 0.3; echo survived"));
        done.store(true, Ordering::SeqCst);
        pelter.join().unwrap();

        assert!(DELIVERED.load(Ordering::SeqCst) > 0);
        let out = result.unwrap().into_captured().unwrap();
        assert_eq!(out.as_bytes(), b"survived\n");
    }
}
