use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Local};

use crate::run::{AnalyzerConfig, RunLayout};

/// Convenience wrapper bundling the config, the binary and a prepared layout.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: AnalyzerConfig,
    pub binary: PathBuf,
    pub layout: RunLayout,
    pub started: DateTime<Local>,
}

impl RunContext {
    /// Compute the layout for a run starting now and create its directories.
    pub fn prepare(config: AnalyzerConfig, binary: impl AsRef<Path>) -> Result<Self> {
        Self::prepare_at(config, binary, Local::now())
    }

    pub fn prepare_at(
        config: AnalyzerConfig,
        binary: impl AsRef<Path>,
        started: DateTime<Local>,
    ) -> Result<Self> {
        let binary = binary.as_ref().to_path_buf();
        let layout = RunLayout::new(&config.output_root, &config.logs_dir, &binary, &started);
        layout.ensure_dirs()?;
        Ok(Self { config, binary, layout, started })
    }
}
