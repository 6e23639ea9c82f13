//! Value records produced while scanning dump output.
//!
//! Every record is created once from one (or a run of) text lines and never
//! mutated afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Address span of one function as seen in a disassembly dump.
///
/// `end` is the address of the last instruction line observed before the next
/// function header (or end of input), so `size` does not include the length of
/// that final instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRange {
    pub name: String,
    pub start: u64,
    pub end: u64,
    pub size: u64,
}

impl FunctionRange {
    /// A freshly opened function that has not seen any instruction yet.
    pub fn opened(name: impl Into<String>, start: u64) -> Self {
        Self { name: name.into(), start, end: start, size: 0 }
    }

    /// Close the range at `end`, recomputing `size`.
    pub fn close_at(mut self, end: u64) -> Self {
        self.end = end;
        self.size = end.saturating_sub(self.start);
        self
    }
}

/// A function entry from a symbol table dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSymbol {
    pub name: String,
    pub address: u64,
    pub size: u64,
}

/// Sections that hold user-visible globals and statics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataSection {
    #[serde(rename = ".data")]
    Data,
    #[serde(rename = ".bss")]
    Bss,
    #[serde(rename = ".rodata")]
    Rodata,
}

impl DataSection {
    /// Recognise a section token exactly as printed by objdump.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            ".data" => Some(Self::Data),
            ".bss" => Some(Self::Bss),
            ".rodata" => Some(Self::Rodata),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => ".data",
            Self::Bss => ".bss",
            Self::Rodata => ".rodata",
        }
    }
}

impl fmt::Display for DataSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An object symbol living in one of the [`DataSection`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSymbol {
    pub name: String,
    pub address: u64,
    pub size: u64,
    pub section: DataSection,
}

/// A disassembly line that mentions at least one configured register.
///
/// `register` is the first configured register found in the line; `line` is
/// the raw line without its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterMatch {
    pub register: String,
    pub line: String,
}

/// One row of Berkeley-format `size` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRow {
    pub text: u64,
    pub data: u64,
    pub bss: u64,
    pub total: u64,
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_at_computes_size() {
        let range = FunctionRange::opened("main", 0x8000_0000).close_at(0x8000_0004);
        assert_eq!(range.end, 0x8000_0004);
        assert_eq!(range.size, 4);
    }

    #[test]
    fn data_section_labels_round_trip() {
        for label in [".data", ".bss", ".rodata"] {
            assert_eq!(DataSection::from_label(label).map(|s| s.as_str()), Some(label));
        }
        assert_eq!(DataSection::from_label(".text"), None);
        assert_eq!(
            serde_json::to_string(&DataSection::Bss).expect("serialize section"),
            "\".bss\""
        );
    }
}
