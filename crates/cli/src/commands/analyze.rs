use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::Args;
use log::{info, warn};
use objdump_analyzer_core::analysis::RegisterFilter;
use objdump_analyzer_core::backends::{DumpKind, DumpSource, ObjdumpBackend, ReplayBackend};
use objdump_analyzer_core::run::{sha256_file, RunContext};
use objdump_analyzer_core::services::report::{write_json, write_summary_file, RunMetadata};
use objdump_analyzer_core::services::{AnalysisReport, Analyzer, WriterSink};

use crate::canonicalize_or_current;
use crate::commands::util::load_config;

/// Options for a full analysis run.
#[derive(Args, Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Path to the object/ELF file.
    #[arg(short, long)]
    pub file: String,

    /// Toolchain prefix (e.g. riscv64-unknown-elf-) or full objdump name.
    #[arg(short, long)]
    pub arch: Option<String>,

    /// Registers to filter disassembly lines by.
    #[arg(short, long, num_args = 1..)]
    pub register: Vec<String>,

    /// JSON or YAML config file.
    #[arg(long)]
    pub config: Option<String>,

    /// Root directory for timestamped run directories.
    #[arg(long)]
    pub output_root: Option<String>,

    /// Directory for per-run log files.
    #[arg(long)]
    pub logs_dir: Option<String>,

    /// Re-analyse the dumps saved in a previous run directory instead of running objdump.
    #[arg(long)]
    pub replay: Option<String>,

    /// Do not copy the input binary into the run directory.
    #[arg(long, default_value_t = false)]
    pub no_copy: bool,

    /// Skip the binutils `size` report.
    #[arg(long, default_value_t = false)]
    pub no_size: bool,

    /// Emit the report as JSON instead of a human-readable summary.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Resolve configuration and create the run/log directories.
pub fn prepare_run(opts: &AnalyzeOptions) -> Result<RunContext> {
    let mut config =
        load_config(opts.config.as_deref(), opts.arch.clone(), opts.register.clone())?;
    if let Some(root) = &opts.output_root {
        config.output_root = root.clone();
    }
    if let Some(logs) = &opts.logs_dir {
        config.logs_dir = logs.clone();
    }
    if opts.no_copy {
        config.copy_input = false;
    }
    if opts.no_size {
        config.size_report = false;
    }

    let binary = canonicalize_or_current(&opts.file)?;
    if opts.replay.is_none() && !binary.is_file() {
        return Err(anyhow!("Binary file does not exist: {}", binary.display()));
    }
    RunContext::prepare(config, binary)
}

/// Run objdump (or replay saved dumps) and write every run artifact.
pub fn analyze_command(ctx: &RunContext, opts: &AnalyzeOptions) -> Result<AnalysisReport> {
    let layout = &ctx.layout;
    let config = &ctx.config;

    info!("Initialized analysis for: {}", ctx.binary.display());
    info!("Architecture: {}", config.arch.as_deref().unwrap_or("(host)"));
    info!("Output directory set to: {}", layout.run_dir.display());

    if config.copy_input && ctx.binary.is_file() {
        if let Err(e) = fs::copy(&ctx.binary, &layout.input_copy_path) {
            warn!("Failed to copy input file to output directory: {e}");
        }
    }

    let source: Box<dyn DumpSource> = match &opts.replay {
        Some(dir) => {
            let dir = canonicalize_or_current(dir)?;
            if layout.run_dir.canonicalize().ok().as_ref() == Some(&dir) {
                return Err(anyhow!("Cannot replay into the run directory being written"));
            }
            Box::new(ReplayBackend::new(dir))
        }
        None => Box::new(ObjdumpBackend::new(config.toolchain())),
    };

    let filter = RegisterFilter::new(config.registers.clone()).context("Invalid register name")?;
    let mut sink = WriterSink::create(&layout.registers_path).with_context(|| {
        format!("Failed to create register log {}", layout.registers_path.display())
    })?;
    let report = Analyzer::new(&*source, filter)
        .with_size_report(config.size_report)
        .run(&ctx.binary, Some(layout), &mut sink)?;
    drop(sink);

    write_summary_file(&layout.summary_path, &report)?;
    write_json(&layout.report_path, &report)?;

    let metadata = RunMetadata {
        binary: ctx.binary.display().to_string(),
        binary_hash: if ctx.binary.is_file() { Some(sha256_file(&ctx.binary)?) } else { None },
        disassembler: source.describe(DumpKind::Disassembly),
        symbol_dumper: source.describe(DumpKind::SymbolTable),
        size_tool: config.size_report.then(|| source.describe(DumpKind::SectionSizes)),
        registers: config.registers.clone(),
        run_dir: layout.run_dir.display().to_string(),
        started_at: ctx.started.to_rfc3339(),
        finished_at: Local::now().to_rfc3339(),
    };
    write_json(&layout.metadata_path, &metadata)?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_run_summary(&layout.run_dir, &report);
    }

    Ok(report)
}

fn print_run_summary(run_dir: &Path, report: &AnalysisReport) {
    println!("Analysis complete:");
    println!("  Binary: {}", report.binary);
    println!("  Run dir: {}", run_dir.display());
    println!("  Functions: {}", report.functions.len());
    println!("  Function symbols: {}", report.function_symbols.len());
    println!("  Data symbols: {}", report.data_symbols.len());
    println!("  Register matches: {}", report.register_matches);
    if let Some(rows) = &report.sizes {
        for row in rows {
            println!(
                "  Size: text={} data={} bss={} total={} ({})",
                row.text, row.data, row.bss, row.total, row.filename
            );
        }
    }
}
