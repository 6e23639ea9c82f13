use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Args;
use log::{info, warn};
use objdump_analyzer_core::analysis::{
    extract_data_symbols, extract_function_symbols, parse_size_report, FunctionRangeExtractor,
    RegisterFilter,
};
use objdump_analyzer_core::backends::DumpKind;
use objdump_analyzer_core::services::{RegisterSink, WriterSink};

use crate::commands::util::{load_config, LineOrigin};
use crate::hex_addr;

/// Selects one dump: a saved text file, or a binary to run binutils on.
#[derive(Args, Debug, Clone, Default)]
pub struct DumpOptions {
    /// Saved dump text to parse instead of running a tool.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub input: Option<String>,

    /// Object/ELF file to run objdump (or size) on.
    #[arg(short, long)]
    pub file: Option<String>,

    /// Toolchain prefix (e.g. riscv64-unknown-elf-) or full objdump name.
    #[arg(short, long)]
    pub arch: Option<String>,

    /// JSON or YAML config file.
    #[arg(long)]
    pub config: Option<String>,
}

impl DumpOptions {
    fn origin(&self, registers: Vec<String>) -> Result<(LineOrigin, Vec<String>)> {
        let config = load_config(self.config.as_deref(), self.arch.clone(), registers)?;
        let registers = config.registers.clone();
        let origin = LineOrigin::new(self.input.as_deref(), self.file.as_deref(), config)?;
        Ok((origin, registers))
    }
}

/// Print function address ranges from a disassembly dump.
pub fn functions_command(opts: &DumpOptions, json: bool) -> Result<()> {
    let (origin, _) = opts.origin(Vec::new())?;
    let mut extractor = FunctionRangeExtractor::new();
    let mut functions = Vec::new();
    origin.for_each_line(DumpKind::Disassembly, |line| functions.extend(extractor.push(line)))?;
    functions.extend(extractor.finish());

    if json {
        println!("{}", serde_json::to_string_pretty(&functions)?);
        return Ok(());
    }

    println!("Functions ({}):", functions.len());
    if functions.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for f in functions {
        println!(
            "  - {} [{}-{}] size={}",
            f.name,
            hex_addr(f.start),
            hex_addr(f.end),
            f.size
        );
    }
    Ok(())
}

/// Print function symbols, or data-section symbols with `data`, from a
/// symbol table dump.
pub fn symbols_command(opts: &DumpOptions, data: bool, json: bool) -> Result<()> {
    let (origin, _) = opts.origin(Vec::new())?;
    let lines = origin.collect(DumpKind::SymbolTable)?;

    if data {
        let vars = extract_data_symbols(&lines);
        if json {
            println!("{}", serde_json::to_string_pretty(&vars)?);
            return Ok(());
        }
        println!("Data symbols ({}):", vars.len());
        if vars.is_empty() {
            println!("  (none)");
        }
        for v in vars {
            println!("  - {} [{}] addr={} size={}", v.name, v.section, hex_addr(v.address), v.size);
        }
        return Ok(());
    }

    let syms = extract_function_symbols(&lines);
    if json {
        println!("{}", serde_json::to_string_pretty(&syms)?);
        return Ok(());
    }
    println!("Function symbols ({}):", syms.len());
    if syms.is_empty() {
        println!("  (none)");
    }
    for s in syms {
        println!("  - {} addr={} size={}", s.name, hex_addr(s.address), s.size);
    }
    Ok(())
}

/// Print every disassembly line that uses one of the configured registers.
///
/// Registers come from `registers`, or the config file when none are given.
pub fn registers_command(opts: &DumpOptions, registers: Vec<String>) -> Result<usize> {
    let (origin, registers) = opts.origin(registers)?;
    if registers.is_empty() {
        warn!("No registers configured; nothing will match");
    }
    let filter = RegisterFilter::new(registers).context("Invalid register name")?;

    let stdout = io::stdout();
    let mut sink = WriterSink::new(stdout.lock());
    let mut failure = None;
    origin.for_each_line(DumpKind::Disassembly, |line| {
        if failure.is_some() {
            return;
        }
        if let Some(hit) = filter.check(line) {
            info!("Register match [{}]: {}", hit.register, hit.line.trim());
            if let Err(e) = sink.record(&hit) {
                failure = Some(e);
            }
        }
    })?;
    if let Some(e) = failure {
        return Err(e).context("Failed to write register matches");
    }
    sink.finish().context("Failed to flush register matches")?;
    let written = sink.written();
    drop(sink);
    io::stdout().flush()?;
    Ok(written)
}

/// Print the Berkeley `size` table.
pub fn size_command(opts: &DumpOptions, json: bool) -> Result<()> {
    let (origin, _) = opts.origin(Vec::new())?;
    let rows = parse_size_report(origin.collect(DumpKind::SectionSizes)?);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    println!("{:>10} {:>10} {:>10} {:>10}  filename", "text", "data", "bss", "total");
    for row in rows {
        println!(
            "{:>10} {:>10} {:>10} {:>10}  {}",
            row.text, row.data, row.bss, row.total, row.filename
        );
    }
    Ok(())
}
