use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::debug;

use super::{lossy_lines, DumpKind, DumpSource, LineStream, ToolError};

/// Re-reads the dumps a previous run saved (`objdump.txt`, `symbols.txt`,
/// `size.txt`) instead of invoking any tool. The binary path is ignored.
#[derive(Debug, Clone)]
pub struct ReplayBackend {
    pub run_dir: PathBuf,
}

impl ReplayBackend {
    pub fn new(run_dir: impl Into<PathBuf>) -> Self {
        Self { run_dir: run_dir.into() }
    }

    pub fn dump_path(&self, kind: DumpKind) -> PathBuf {
        self.run_dir.join(kind.file_name())
    }
}

impl DumpSource for ReplayBackend {
    fn lines(&self, kind: DumpKind, _binary: &Path) -> Result<LineStream<'_>, ToolError> {
        let path = self.dump_path(kind);
        if !path.is_file() {
            return Err(ToolError::MissingDump(path));
        }
        debug!("replaying {}", path.display());
        let reader = BufReader::new(File::open(&path)?);
        Ok(Box::new(lossy_lines(reader).map(|line| line.map_err(ToolError::from))))
    }

    fn describe(&self, kind: DumpKind) -> String {
        format!("replay:{}", self.dump_path(kind).display())
    }
}

/// Read a standalone dump file (e.g. saved `objdump -d` output) into lines.
pub fn read_dump_file(path: &Path) -> Result<Vec<String>, ToolError> {
    if !path.is_file() {
        return Err(ToolError::MissingDump(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    lossy_lines(reader).map(|line| line.map_err(ToolError::from)).collect()
}
