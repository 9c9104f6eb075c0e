use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use exec_engine::Errno;
use exec_engine::retry::retry_eintr;
use nix::sys::stat::Mode;
use tracing::trace;

use crate::error::{FsError, Result};

fn dir_mode() -> Mode {
    Mode::S_IRWXU | Mode::S_IRGRP | Mode::S_IXGRP | Mode::S_IROTH | Mode::S_IXOTH
}

fn make_dir(path: &Path) -> Result<()> {
    match retry_eintr(|| nix::unistd::mkdir(path, dir_mode())) {
        Ok(()) | Err(Errno::EEXIST) => Ok(()),
        Err(errno) => Err(FsError::syscall(path, "mkdir", errno)),
    }
}

/// `mkdir -p`: create `path` and every missing ancestor (mode `0755`).
///
/// Already existing components are not an error.
pub fn mkdirp(path: &Path) -> Result<()> {
    let bytes = path.as_os_str().as_bytes();
    let prefixes = bytes
        .iter()
        .enumerate()
        .filter(|&(i, &b)| b == b'/' && i > 0)
        .filter_map(|(i, _)| bytes.get(..i));

    for prefix in prefixes {
        let prefix = Path::new(OsStr::from_bytes(prefix));
        trace!(path = %prefix.display(), "mkdirp component");
        make_dir(prefix)?;
    }
    make_dir(path)
}

/// Entry names of the directory at `path`, sorted.
pub fn read_dir(path: &Path) -> Result<Vec<String>> {
    let mut names = std::fs::read_dir(path)
        .map_err(|e| FsError::io("readdir", path, e))?
        .map(|entry| {
            entry
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .map_err(|e| FsError::io("readdir", path, e))
        })
        .collect::<Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}
