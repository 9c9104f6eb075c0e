use exec_engine::ExecError;
use exec_fs::FsError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("invalid exec options: {0}")]
    Options(#[from] serde_json::Error),

    #[error("write stdout: {0}")]
    Output(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
