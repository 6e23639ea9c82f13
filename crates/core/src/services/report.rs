//! Serialization of an [`AnalysisReport`] into run artifacts.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::DataSection;
use crate::services::analysis::AnalysisReport;

/// Metadata to persist alongside a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub binary: String,
    pub binary_hash: Option<String>,
    pub disassembler: String,
    pub symbol_dumper: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_tool: Option<String>,
    pub registers: Vec<String>,
    pub run_dir: String,
    pub started_at: String,
    pub finished_at: String,
}

/// Write `value` as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write the human-readable summary to `path`.
pub fn write_summary_file(path: &Path, report: &AnalysisReport) -> Result<()> {
    let mut out = Vec::new();
    write_summary(&mut out, report)?;
    fs::write(path, out).with_context(|| format!("Failed to write summary {}", path.display()))
}

/// Render the summary: size report, function sizes, function symbols and data
/// sections, each under its own heading.
pub fn write_summary<W: Write>(out: &mut W, report: &AnalysisReport) -> io::Result<()> {
    writeln!(out, "Summary for {}", report.binary)?;
    writeln!(out)?;

    if !report.size_lines.is_empty() {
        writeln!(out, "=== ELF Size Report ===")?;
        for line in &report.size_lines {
            writeln!(out, "{}", line.trim_end())?;
        }
        writeln!(out)?;
    }

    writeln!(out, "=== Function Sizes ({}) ===", report.functions.len())?;
    for f in &report.functions {
        writeln!(out, "{:<40} {:08x}-{:08x} {:>8} bytes", f.name, f.start, f.end, f.size)?;
    }
    writeln!(out)?;

    writeln!(out, "=== Function Symbols ({}) ===", report.function_symbols.len())?;
    for s in &report.function_symbols {
        writeln!(out, "{:<40} {:08x} {:>8} bytes", s.name, s.address, s.size)?;
    }
    writeln!(out)?;

    writeln!(out, "=== Data Sections ({}) ===", report.data_symbols.len())?;
    for section in [DataSection::Data, DataSection::Bss, DataSection::Rodata] {
        let vars: Vec<_> = report.data_symbols.iter().filter(|v| v.section == section).collect();
        if vars.is_empty() {
            continue;
        }
        let total: u64 = vars.iter().map(|v| v.size).sum();
        writeln!(out, "{} ({} symbols, {} bytes)", section, vars.len(), total)?;
        for v in vars {
            writeln!(out, "  {:<38} {:08x} {:>8} bytes", v.name, v.address, v.size)?;
        }
    }
    writeln!(out)?;

    writeln!(out, "=== Register Matches ===")?;
    writeln!(out, "{} matching lines", report.register_matches)?;
    Ok(())
}
