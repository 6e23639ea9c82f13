use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::{
    extract_data_symbols, extract_function_symbols, parse_size_report, FunctionRangeExtractor,
    RegisterFilter,
};
use crate::backends::{DumpKind, DumpSource, ToolError};
use crate::model::{DataSymbol, FunctionRange, FunctionSymbol, SizeRow};
use crate::run::RunLayout;
use crate::services::sink::RegisterSink;

/// Everything one run extracted from the dumps of a binary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub binary: String,
    pub functions: Vec<FunctionRange>,
    pub function_symbols: Vec<FunctionSymbol>,
    pub data_symbols: Vec<DataSymbol>,
    pub register_matches: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<SizeRow>>,
    /// Raw `size` output, kept for the human-readable summary.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub size_lines: Vec<String>,
}

/// Result of streaming the disassembly once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisassemblyScan {
    pub functions: Vec<FunctionRange>,
    pub register_matches: usize,
    pub lines: usize,
}

/// Coordinator that pulls dumps from a [`DumpSource`] and folds them through
/// the extractors. When given a [`RunLayout`], every raw dump is also saved
/// into the run directory as it is read.
pub struct Analyzer<'a> {
    pub source: &'a dyn DumpSource,
    pub filter: RegisterFilter,
    pub size_report: bool,
}

impl<'a> Analyzer<'a> {
    pub fn new(source: &'a dyn DumpSource, filter: RegisterFilter) -> Self {
        Self { source, filter, size_report: true }
    }

    pub fn with_size_report(mut self, enabled: bool) -> Self {
        self.size_report = enabled;
        self
    }

    /// Run every extraction for `binary`.
    pub fn run(
        &self,
        binary: &Path,
        layout: Option<&RunLayout>,
        sink: &mut dyn RegisterSink,
    ) -> Result<AnalysisReport> {
        info!("Analyzing {}", binary.display());
        if self.filter.is_empty() {
            info!("Registers: None");
        } else {
            info!("Registers: {}", self.filter.registers().join(", "));
        }

        let (sizes, size_lines) = if self.size_report {
            match self.collect(DumpKind::SectionSizes, binary, layout) {
                Ok(lines) => {
                    info!("ELF Size Report:\n{}", lines.join("\n"));
                    (Some(parse_size_report(&lines)), lines)
                }
                Err(e) => {
                    warn!("Skipping size report: {e:#}");
                    (None, Vec::new())
                }
            }
        } else {
            (None, Vec::new())
        };

        let scan = self.scan_disassembly(binary, layout, sink)?;
        let symbol_lines = self.collect(DumpKind::SymbolTable, binary, layout)?;
        let function_symbols = extract_function_symbols(&symbol_lines);
        let data_symbols = extract_data_symbols(&symbol_lines);

        info!(
            "Found {} functions, {} function symbols, {} data symbols, {} register matches",
            scan.functions.len(),
            function_symbols.len(),
            data_symbols.len(),
            scan.register_matches
        );

        Ok(AnalysisReport {
            binary: binary.display().to_string(),
            functions: scan.functions,
            function_symbols,
            data_symbols,
            register_matches: scan.register_matches,
            sizes,
            size_lines,
        })
    }

    /// Stream the disassembly once, feeding the range extractor and the
    /// register filter line by line without buffering the dump.
    pub fn scan_disassembly(
        &self,
        binary: &Path,
        layout: Option<&RunLayout>,
        sink: &mut dyn RegisterSink,
    ) -> Result<DisassemblyScan> {
        let kind = DumpKind::Disassembly;
        let mut tee = open_tee(layout, kind)?;
        let mut extractor = FunctionRangeExtractor::new();
        let mut scan = DisassemblyScan::default();

        info!("Running {} for {}", self.source.describe(kind), binary.display());
        for line in self.source.lines(kind, binary).map_err(tool_error(kind))? {
            let line = line.map_err(tool_error(kind))?;
            scan.lines += 1;
            if let Some(out) = tee.as_mut() {
                writeln!(out, "{line}").context("Failed to save disassembly")?;
            }
            if let Some(function) = extractor.push(&line) {
                debug!("function {} size {}", function.name, function.size);
                scan.functions.push(function);
            }
            if let Some(hit) = self.filter.check(&line) {
                info!("Register match [{}]: {}", hit.register, hit.line.trim());
                sink.record(&hit).context("Failed to record register match")?;
                scan.register_matches += 1;
            }
        }
        scan.functions.extend(extractor.finish());

        sink.finish().context("Failed to flush register matches")?;
        if let Some(mut out) = tee {
            out.flush().context("Failed to save disassembly")?;
        }
        Ok(scan)
    }

    /// Materialise a whole dump, saving it into the run directory if requested.
    pub fn collect(
        &self,
        kind: DumpKind,
        binary: &Path,
        layout: Option<&RunLayout>,
    ) -> Result<Vec<String>> {
        info!("Running {} for {}", self.source.describe(kind), binary.display());
        let lines = self
            .source
            .lines(kind, binary)
            .map_err(tool_error(kind))?
            .collect::<Result<Vec<String>, ToolError>>()
            .map_err(tool_error(kind))?;

        if let Some(mut out) = open_tee(layout, kind)? {
            for line in &lines {
                writeln!(out, "{line}")?;
            }
            out.flush()
                .with_context(|| format!("Failed to save {}", kind.file_name()))?;
        }
        Ok(lines)
    }
}

fn open_tee(layout: Option<&RunLayout>, kind: DumpKind) -> Result<Option<BufWriter<File>>> {
    layout
        .map(|layout| {
            let path = layout.dump_path(kind);
            debug!("Writing {} to {}", kind.file_name(), path.display());
            File::create(&path)
                .map(BufWriter::new)
                .with_context(|| format!("Failed to create {}", path.display()))
        })
        .transpose()
}

fn tool_error(kind: DumpKind) -> impl Fn(ToolError) -> anyhow::Error {
    move |e| anyhow::Error::new(e).context(format!("Failed to read {} dump", kind.tool()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::CannedBackend;
    use crate::services::sink::MemorySink;

    fn disassembly() -> Vec<&'static str> {
        vec![
            "80000000 <main>:",
            "80000000:\t13 01 00 00 \taddi x2,x2,0",
            "80000004:\tef 00 00 00 \tjal x1,0",
            "80000010 <done>:",
        ]
    }

    #[test]
    fn scan_streams_functions_and_register_hits() {
        let source = CannedBackend::new().with(DumpKind::Disassembly, disassembly());
        let analyzer = Analyzer::new(&source, RegisterFilter::new(["x1"]).unwrap());
        let mut sink = MemorySink::default();

        let scan = analyzer.scan_disassembly(Path::new("fw.elf"), None, &mut sink).unwrap();
        assert_eq!(scan.lines, 4);
        assert_eq!(scan.functions.len(), 2);
        assert_eq!(scan.functions[0].size, 4);
        assert_eq!(scan.register_matches, 1);
        assert_eq!(sink.matches[0].line, "80000004:\tef 00 00 00 \tjal x1,0");
    }

    #[test]
    fn missing_size_dump_is_not_fatal() {
        let source = CannedBackend::new()
            .with(DumpKind::Disassembly, disassembly())
            .with(DumpKind::SymbolTable, ["80000000 g     F .text\t00000008 main"]);
        let analyzer = Analyzer::new(&source, RegisterFilter::new(Vec::<String>::new()).unwrap());

        let report = analyzer.run(Path::new("fw.elf"), None, &mut MemorySink::default()).unwrap();
        assert_eq!(report.sizes, None);
        assert_eq!(report.function_symbols.len(), 1);
        assert_eq!(report.register_matches, 0);
    }

    #[test]
    fn missing_disassembly_fails_the_run() {
        let source = CannedBackend::new();
        let analyzer = Analyzer::new(&source, RegisterFilter::new(["a0"]).unwrap())
            .with_size_report(false);
        let err = analyzer.run(Path::new("fw.elf"), None, &mut MemorySink::default()).unwrap_err();
        assert!(format!("{err:#}").contains("objdump"));
    }
}
