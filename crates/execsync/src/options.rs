//! The host's per-call options object: `{ "cwd"?: string, "stdio"?: string }`.

use std::path::PathBuf;

use exec_engine::{ExecutionRequest, StdioMode};
use serde::Deserialize;
use serde_json::Value;

/// The only `stdio` value that selects inherited streams.
const STDIO_INHERIT: &str = "inherit";

#[derive(Debug, Default, Deserialize)]
struct RawOptions {
    #[serde(default)]
    cwd: Option<Value>,
    #[serde(default)]
    stdio: Option<Value>,
}

/// Resolved exec options. Anything the host sends that is not understood
/// falls back to the default (no cwd, captured stdio).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecOptions {
    pub cwd: Option<PathBuf>,
    pub stdio: StdioMode,
}

impl ExecOptions {
    /// Parse an options object from JSON. Non-object values yield defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Ok(Self::default());
        }
        let raw: RawOptions = serde_json::from_value(value)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawOptions) -> Self {
        // A non-string cwd is ignored rather than rejected.
        let cwd = raw
            .cwd
            .as_ref()
            .and_then(Value::as_str)
            .map(PathBuf::from);
        let stdio = match raw.stdio.as_ref().and_then(Value::as_str) {
            Some(STDIO_INHERIT) => StdioMode::Inherited,
            _ => StdioMode::Captured,
        };
        Self { cwd, stdio }
    }

    pub fn into_request(self, command: impl Into<String>) -> ExecutionRequest {
        let request = ExecutionRequest::new(command).stdio(self.stdio);
        match self.cwd {
            Some(dir) => request.cwd(dir),
            None => request,
        }
    }
}
