use std::io::Write;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use exec_engine::{ExecOutput, ExecutionRequest, StdioMode, execute};
use tracing::info;

use crate::error::CliResult;
use crate::options::ExecOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StdioArg {
    /// Pipe stdout back and print it; stdin/stderr go to /dev/null
    Captured,
    /// Let the command use this process's streams directly
    Inherited,
}

impl From<StdioArg> for StdioMode {
    fn from(arg: StdioArg) -> Self {
        match arg {
            StdioArg::Captured => StdioMode::Captured,
            StdioArg::Inherited => StdioMode::Inherited,
        }
    }
}

#[derive(Debug, Args)]
pub struct ExecArgs {
    /// Shell command, run as `/bin/sh -c <COMMAND>`
    pub command: String,

    /// Working directory for the command
    #[arg(long, env = "EXECSYNC_CWD")]
    pub cwd: Option<PathBuf>,

    /// Stdio mode (overrides --options)
    #[arg(long, value_enum)]
    pub stdio: Option<StdioArg>,

    /// Host options object as JSON, e.g. '{"cwd": "/tmp", "stdio": "inherit"}'
    #[arg(long)]
    pub options: Option<String>,
}

impl ExecArgs {
    /// Options object first, then explicit flags on top.
    pub fn to_request(&self) -> CliResult<ExecutionRequest> {
        let mut opts = match &self.options {
            Some(json) => ExecOptions::from_json(json)?,
            None => ExecOptions::default(),
        };
        if let Some(dir) = &self.cwd {
            opts.cwd = Some(dir.clone());
        }
        if let Some(stdio) = self.stdio {
            opts.stdio = stdio.into();
        }
        Ok(opts.into_request(self.command.as_str()))
    }
}

/// Run the command; captured bytes go to stdout verbatim.
pub fn run_exec(args: ExecArgs) -> CliResult<()> {
    let request = args.to_request()?;
    info!(
        cwd = ?request.working_dir(),
        stdio = ?request.stdio_mode(),
        "exec"
    );

    match execute(&request)? {
        ExecOutput::Captured(output) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(output.as_bytes())?;
            stdout.flush()?;
        }
        ExecOutput::Inherited => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn args(options: Option<&str>, cwd: Option<&str>, stdio: Option<StdioArg>) -> ExecArgs {
        ExecArgs {
            command: "true".into(),
            cwd: cwd.map(PathBuf::from),
            stdio,
            options: options.map(String::from),
        }
    }

    #[test]
    fn defaults_without_flags() {
        let req = args(None, None, None).to_request().unwrap();
        assert_eq!(req.stdio_mode(), StdioMode::Captured);
        assert!(req.working_dir().is_none());
    }

    #[test]
    fn options_json_is_applied() {
        let req = args(Some(r#"{"cwd": "/a", "stdio": "inherit"}"#), None, None)
            .to_request()
            .unwrap();
        assert_eq!(req.working_dir(), Some(Path::new("/a")));
        assert_eq!(req.stdio_mode(), StdioMode::Inherited);
    }

    #[test]
    fn flags_override_options_json() {
        let req = args(
            Some(r#"{"cwd": "/a", "stdio": "inherit"}"#),
            Some("/b"),
            Some(StdioArg::Captured),
        )
        .to_request()
        .unwrap();
        assert_eq!(req.working_dir(), Some(Path::new("/b")));
        assert_eq!(req.stdio_mode(), StdioMode::Captured);
    }

    #[test]
    fn bad_options_json_is_reported() {
        let err = args(Some("not json"), None, None).to_request().unwrap_err();
        assert!(err.to_string().starts_with("invalid exec options"));
    }
}
