mod error;
mod exec;
mod host;
mod options;

use std::fmt;
use std::process::ExitCode;
use std::time::Instant;

use clap::{ArgAction, Parser, Subcommand};
use exec_engine::ExecError;
use tracing::Level;
use tracing_subscriber::fmt::time::FormatTime;

use crate::error::{CliError, CliResult};

struct Elapsed(Instant);

impl FormatTime for Elapsed {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let d = self.0.elapsed();
        let total_secs = d.as_secs();
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        let millis = d.subsec_millis();
        write!(w, "[{mins:02}:{secs:02}:{millis:03}]")
    }
}

#[derive(Parser)]
#[command(name = "execsync", version)]
struct Cli {
    /// Log more (-v debug, -vv trace); logs go to stderr
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a shell command synchronously
    Exec(exec::ExecArgs),
    /// Print a file's bytes to stdout
    ReadFile(host::PathArg),
    /// Create or truncate a file with the given content
    WriteFile(host::WriteFileArgs),
    /// Create a directory and any missing parents
    Mkdirp(host::PathArg),
    /// Print whether a path exists
    Exists(host::PathArg),
    /// Print the canonical absolute path
    Realpath(host::PathArg),
    /// List directory entries, sorted
    Readdir(host::PathArg),
    /// Print the current working directory
    Cwd,
    /// Print an environment variable (exit 1 if unset)
    Getenv(host::GetenvArgs),
    /// Print platform and architecture as JSON
    Info(host::InfoArgs),
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn run(command: Command) -> CliResult<ExitCode> {
    match command {
        Command::Exec(args) => exec::run_exec(args)?,
        Command::ReadFile(args) => host::run_read_file(args)?,
        Command::WriteFile(args) => host::run_write_file(args)?,
        Command::Mkdirp(args) => host::run_mkdirp(args)?,
        Command::Exists(args) => host::run_exists(args)?,
        Command::Realpath(args) => host::run_realpath(args)?,
        Command::Readdir(args) => host::run_read_dir(args)?,
        Command::Cwd => host::run_cwd()?,
        Command::Getenv(args) => {
            if !host::run_getenv(args)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Info(args) => host::run_info(args)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Exit status for a failed command: its own code when representable.
fn failed_exit_code(code: i32) -> u8 {
    u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_timer(Elapsed(Instant::now()))
        .with_max_level(log_level(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = exec_engine::signal::ignore_broken_pipe() {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli.command) {
        Ok(code) => code,
        Err(CliError::Exec(ExecError::Failed { code })) => {
            eprintln!("error: command exited with non-zero code {code}");
            ExitCode::from(failed_exit_code(code))
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
