use std::fs;
use std::io::{self, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// Ensure every directory in `dirs` exists.
pub fn ensure_directories(dirs: &[&Path]) -> Result<()> {
    for dir in dirs {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(())
}

/// File name of `binary` without its extension.
///
/// Falls back to `binary` for paths without a final component (e.g. `/`).
pub fn file_stem(binary: &Path) -> String {
    binary.file_stem().and_then(|os| os.to_str()).unwrap_or("binary").to_string()
}

/// Hex SHA-256 of the analysed binary, recorded in `run_metadata.json` so a
/// run directory can be matched to the exact input it was made from.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open binary for hashing: {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut BufReader::new(file), &mut hasher)
        .with_context(|| format!("Failed to read binary for hashing: {}", path.display()))?;
    Ok(format!("{:x}", hasher.finalize()))
}
