//! Filesystem, environment and platform subcommands.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::error::CliResult;

#[derive(Debug, Args)]
pub struct PathArg {
    pub path: PathBuf,
}

#[derive(Debug, Args)]
pub struct WriteFileArgs {
    pub path: PathBuf,
    /// Content to write; the file is created with mode 0755
    pub content: String,
}

#[derive(Debug, Args)]
pub struct GetenvArgs {
    pub name: String,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Platform reported to scripts
    #[arg(long, env = "EXECSYNC_PLATFORM", default_value = std::env::consts::OS)]
    pub platform: String,

    /// Architecture reported to scripts
    #[arg(long, env = "EXECSYNC_ARCH", default_value = std::env::consts::ARCH)]
    pub arch: String,
}

#[derive(Debug, Serialize)]
struct HostInfo<'a> {
    platform: &'a str,
    arch: &'a str,
}

fn print_line(line: impl std::fmt::Display) -> CliResult<()> {
    writeln!(std::io::stdout().lock(), "{line}")?;
    Ok(())
}

pub fn run_read_file(args: PathArg) -> CliResult<()> {
    let content = exec_fs::read_file(&args.path)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&content)?;
    stdout.flush()?;
    Ok(())
}

pub fn run_write_file(args: WriteFileArgs) -> CliResult<()> {
    exec_fs::write_file(&args.path, args.content.as_bytes())?;
    Ok(())
}

pub fn run_mkdirp(args: PathArg) -> CliResult<()> {
    exec_fs::mkdirp(&args.path)?;
    Ok(())
}

pub fn run_exists(args: PathArg) -> CliResult<()> {
    print_line(exec_fs::exists(&args.path)?)
}

pub fn run_realpath(args: PathArg) -> CliResult<()> {
    print_line(exec_fs::realpath(&args.path)?.display())
}

pub fn run_read_dir(args: PathArg) -> CliResult<()> {
    for name in exec_fs::read_dir(&args.path)? {
        print_line(name)?;
    }
    Ok(())
}

pub fn run_cwd() -> CliResult<()> {
    print_line(exec_fs::cwd()?.display())
}

/// Prints the value. Returns `false` (and prints nothing) when unset.
pub fn run_getenv(args: GetenvArgs) -> CliResult<bool> {
    match std::env::var_os(&args.name) {
        Some(value) => {
            print_line(value.to_string_lossy())?;
            Ok(true)
        }
        None => Ok(false),
    }
}

pub fn run_info(args: InfoArgs) -> CliResult<()> {
    let info = HostInfo {
        platform: &args.platform,
        arch: &args.arch,
    };
    print_line(serde_json::to_string(&info)?)
}
