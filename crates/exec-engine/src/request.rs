use std::path::{Path, PathBuf};

/// Where the child's standard streams go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StdioMode {
    /// stdout is piped back to the caller; stdin and stderr go to `/dev/null`.
    #[default]
    Captured,
    /// The child shares the caller's own stdin/stdout/stderr.
    Inherited,
}

/// A single shell command to run. Built per call, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    command: String,
    cwd: Option<PathBuf>,
    stdio: StdioMode,
}

impl ExecutionRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cwd: None,
            stdio: StdioMode::default(),
        }
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn stdio(mut self, mode: StdioMode) -> Self {
        self.stdio = mode;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn stdio_mode(&self) -> StdioMode {
        self.stdio
    }
}

/// Outcome of a successful [`crate::execute`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutput {
    Captured(crate::CapturedOutput),
    /// The child wrote straight to the caller's streams; nothing to return.
    Inherited,
}

impl ExecOutput {
    pub fn into_captured(self) -> Option<crate::CapturedOutput> {
        match self {
            ExecOutput::Captured(out) => Some(out),
            ExecOutput::Inherited => None,
        }
    }
}
