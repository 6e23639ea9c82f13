use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use objdump_analyzer_core::backends::{lossy_lines, DumpKind, DumpSource, ObjdumpBackend};
use objdump_analyzer_core::run::AnalyzerConfig;

use crate::canonicalize_or_current;

/// Load the config file if one was given, then apply CLI overrides.
pub fn load_config(
    config: Option<&str>,
    arch: Option<String>,
    registers: Vec<String>,
) -> Result<AnalyzerConfig> {
    let base = match config {
        Some(path) => AnalyzerConfig::load(&canonicalize_or_current(path)?)?,
        None => AnalyzerConfig::default(),
    };
    Ok(base.with_overrides(arch, registers))
}

/// Where the lines of a single dump come from: a saved text file or a live
/// tool run against a binary.
#[derive(Debug, Clone)]
pub enum LineOrigin {
    Saved(PathBuf),
    Binary { path: PathBuf, config: AnalyzerConfig },
}

impl LineOrigin {
    pub fn new(input: Option<&str>, file: Option<&str>, config: AnalyzerConfig) -> Result<Self> {
        match (input, file) {
            (Some(input), _) => Ok(Self::Saved(canonicalize_or_current(input)?)),
            (None, Some(file)) => {
                let path = canonicalize_or_current(file)?;
                if !path.is_file() {
                    return Err(anyhow!("Binary file does not exist: {}", path.display()));
                }
                Ok(Self::Binary { path, config })
            }
            (None, None) => Err(anyhow!("Either --input <dump> or --file <binary> is required")),
        }
    }

    /// Feed every line of the dump to `f`, streaming when a tool is running.
    pub fn for_each_line(&self, kind: DumpKind, mut f: impl FnMut(&str)) -> Result<()> {
        match self {
            Self::Saved(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open dump {}", path.display()))?;
                for line in lossy_lines(BufReader::new(file)) {
                    let line =
                        line.with_context(|| format!("Failed to read dump {}", path.display()))?;
                    f(&line);
                }
            }
            Self::Binary { path, config } => {
                let backend = ObjdumpBackend::new(config.toolchain());
                let program = backend.describe(kind);
                let lines = backend
                    .lines(kind, path)
                    .with_context(|| format!("Failed to run {program}"))?;
                for line in lines {
                    let line = line.with_context(|| format!("Failed to read {program} output"))?;
                    f(&line);
                }
            }
        }
        Ok(())
    }

    pub fn collect(&self, kind: DumpKind) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        self.for_each_line(kind, |line| lines.push(line.to_string()))?;
        Ok(lines)
    }
}
