use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::backends::DumpKind;
use crate::run::util::file_stem;

/// Logical layout of one analysis run on disk.
///
/// Derived from the output root, the logs directory, the binary name and the
/// run's start time. It does *not* perform any IO itself; see
/// [`RunLayout::ensure_dirs`].
#[derive(Debug, Clone)]
pub struct RunLayout {
    /// Directory that groups all runs of one day (`<root>/MM_DD_YYYY`).
    pub date_dir: PathBuf,
    /// Directory of this run (`<date_dir>/<stem>_HH_MM_SS`).
    pub run_dir: PathBuf,
    /// Directory for per-run log files.
    pub logs_dir: PathBuf,
    /// Log file for this run.
    pub log_path: PathBuf,
    /// Human-readable summary.
    pub summary_path: PathBuf,
    /// Disassembly lines that matched a configured register.
    pub registers_path: PathBuf,
    /// Full analysis result as JSON.
    pub report_path: PathBuf,
    /// Run metadata (input hash, tools, timestamps).
    pub metadata_path: PathBuf,
    /// Where the analysed binary is copied to.
    pub input_copy_path: PathBuf,
}

impl RunLayout {
    /// Compute the layout for analysing `binary` at `started`.
    ///
    /// This does *not* touch the filesystem.
    pub fn new(
        output_root: impl AsRef<Path>,
        logs_dir: impl AsRef<Path>,
        binary: &Path,
        started: &DateTime<Local>,
    ) -> Self {
        let stem = file_stem(binary);
        let date = started.format("%m_%d_%Y").to_string();
        let time = started.format("%H_%M_%S").to_string();

        let date_dir = output_root.as_ref().join(&date);
        let run_dir = date_dir.join(format!("{stem}_{time}"));
        let logs_dir = logs_dir.as_ref().to_path_buf();
        let log_path = logs_dir.join(format!("{stem}_{date}_{time}.log"));
        let input_name = binary
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| stem.clone());

        Self {
            summary_path: run_dir.join("summary.txt"),
            registers_path: run_dir.join("registers.txt"),
            report_path: run_dir.join("report.json"),
            metadata_path: run_dir.join("run_metadata.json"),
            input_copy_path: run_dir.join(input_name),
            date_dir,
            run_dir,
            logs_dir,
            log_path,
        }
    }

    /// Path a raw dump of `kind` is saved to inside the run directory.
    pub fn dump_path(&self, kind: DumpKind) -> PathBuf {
        self.run_dir.join(kind.file_name())
    }

    /// Create the run and logs directories.
    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        crate::run::ensure_directories(&[self.run_dir.as_path(), self.logs_dir.as_path()])
    }
}
