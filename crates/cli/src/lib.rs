use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod commands;
pub mod logging;

/// Resolve a binary, dump or config path given on the command line.
///
/// Existing paths are canonicalized. Paths that do not exist yet (a run
/// directory about to be created, a binary that is reported as missing
/// later) are anchored at the working directory instead.
pub fn canonicalize_or_current(path: &str) -> Result<PathBuf> {
    let path = Path::new(path);
    if let Ok(abs) = path.canonicalize() {
        return Ok(abs);
    }
    let cwd = env::current_dir().context("Failed to get current directory")?;
    Ok(cwd.join(path))
}

/// Render an address the way objdump prints it in 32-bit dumps.
pub fn hex_addr(addr: u64) -> String {
    format!("{addr:08x}")
}
