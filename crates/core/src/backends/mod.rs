//! Producers of dump text.
//!
//! The extractors only ever see lines. Where those lines come from is hidden
//! behind [`DumpSource`]:
//! - [`ObjdumpBackend`] spawns binutils and streams their stdout.
//! - [`ReplayBackend`] reads the dumps saved by a previous run.
//! - [`CannedBackend`] serves lines held in memory.

use std::collections::HashMap;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod objdump;
pub mod replay;

pub use objdump::ObjdumpBackend;
pub use replay::ReplayBackend;

/// The three dumps a run asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DumpKind {
    /// `objdump -x -d`: all headers plus disassembly.
    Disassembly,
    /// `objdump -t`: the symbol table.
    SymbolTable,
    /// `size`: Berkeley section totals.
    SectionSizes,
}

impl DumpKind {
    /// Binutils program name (without any toolchain prefix).
    pub fn tool(&self) -> &'static str {
        match self {
            Self::Disassembly | Self::SymbolTable => "objdump",
            Self::SectionSizes => "size",
        }
    }

    pub fn args(&self) -> &'static [&'static str] {
        match self {
            Self::Disassembly => &["-x", "-d"],
            Self::SymbolTable => &["-t"],
            Self::SectionSizes => &[],
        }
    }

    /// File name the dump is saved under inside a run directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Disassembly => "objdump.txt",
            Self::SymbolTable => "symbols.txt",
            Self::SectionSizes => "size.txt",
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Binary not found at {0}")]
    MissingBinary(PathBuf),
    #[error("Failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} exited with {status}")]
    Exit { tool: String, status: String },
    #[error("Saved dump not found at {0}")]
    MissingDump(PathBuf),
    #[error("I/O error while reading dump: {0}")]
    Io(#[from] std::io::Error),
}

/// Lines of one dump, in output order. Errors are yielded in-band so a
/// streaming producer can report a tool failure after its last line.
pub type LineStream<'a> = Box<dyn Iterator<Item = Result<String, ToolError>> + 'a>;

/// Capability to produce the text of a dump for a binary.
pub trait DumpSource {
    fn lines(&self, kind: DumpKind, binary: &Path) -> Result<LineStream<'_>, ToolError>;

    /// Program name used for `kind`, for logs and run metadata.
    fn describe(&self, kind: DumpKind) -> String;
}

/// Toolchain prefix prepended to binutils program names
/// (e.g. `riscv64-unknown-elf-` gives `riscv64-unknown-elf-objdump`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
    pub prefix: String,
}

impl Toolchain {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Build from an `--arch` style value. Both a bare prefix and a full
    /// objdump name (`riscv64-unknown-elf-objdump`) are accepted.
    pub fn from_arch(arch: Option<&str>) -> Self {
        let arch = arch.unwrap_or_default().trim();
        Self::new(arch.strip_suffix("objdump").unwrap_or(arch))
    }

    pub fn program(&self, tool: &str) -> String {
        format!("{}{}", self.prefix, tool)
    }
}

/// Split `reader` into lines. Invalid UTF-8 is replaced rather than failing
/// the stream, and a trailing `\r` is dropped.
pub fn lossy_lines<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<String>> {
    reader.split(b'\n').map(|bytes| bytes.map(|b| decode_line(&b)))
}

pub(crate) fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end_matches('\r').to_string()
}

/// In-memory dumps keyed by kind; kinds without lines yield a
/// [`ToolError::MissingDump`].
#[derive(Debug, Default, Clone)]
pub struct CannedBackend {
    dumps: HashMap<DumpKind, Vec<String>>,
}

impl CannedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I, S>(mut self, kind: DumpKind, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dumps.insert(kind, lines.into_iter().map(Into::into).collect());
        self
    }
}

impl DumpSource for CannedBackend {
    fn lines(&self, kind: DumpKind, _binary: &Path) -> Result<LineStream<'_>, ToolError> {
        let lines = self
            .dumps
            .get(&kind)
            .ok_or_else(|| ToolError::MissingDump(PathBuf::from(kind.file_name())))?;
        Ok(Box::new(lines.iter().cloned().map(Ok::<String, ToolError>)))
    }

    fn describe(&self, kind: DumpKind) -> String {
        format!("canned:{}", kind.tool())
    }
}
