//! Symbol-table rows as printed by `objdump -t`.
//!
//! The accepted column grammar is
//!
//! ```text
//! ADDRESS FLAGS+ [SECTION] [SIZE] [VISIBILITY] NAME
//! 0000000000001138 g     F .text  0000000000000014 _start
//! 0000000000004010 g     O .data  0000000000000000 .hidden __dso_handle
//! ```
//!
//! FLAGS are the whitespace-separated pieces of objdump's seven-character flag
//! field; the last character of that field is the symbol type marker. A row
//! that deviates from this grammar is skipped as a whole rather than parsed
//! partially.

use log::trace;

use super::{parse_hex, trim_newline};
use crate::model::{DataSection, DataSymbol, FunctionSymbol};

/// Characters objdump may print in the flag field.
const FLAG_CHARS: &str = "lgu!wCWIiDdFfO";

/// Type markers that denote data objects.
const DATA_MARKERS: [char; 4] = ['O', 'D', 'B', 'R'];

/// Markers only valid as the final character of the flag field.
const TYPE_ONLY_MARKERS: [char; 2] = ['B', 'R'];

const VISIBILITY: [&str; 3] = [".hidden", ".protected", ".internal"];

/// A symbol-table row split into its columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolLine<'a> {
    pub address: u64,
    pub marker: char,
    pub section: Option<&'a str>,
    pub size: Option<u64>,
    pub name: &'a str,
}

impl<'a> SymbolLine<'a> {
    /// Split one row, or `None` when it does not fit the grammar.
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut tokens = trim_newline(line).split_whitespace().peekable();

        let address = tokens.next().filter(|t| is_hex(t)).and_then(parse_hex)?;

        let mut marker = None;
        while let Some(token) = tokens.next_if(|t| is_flag_token(t)) {
            marker = token.chars().last();
        }
        let marker = marker?;

        let mut rest: Vec<&str> = tokens.collect();
        let name = rest.pop()?;
        if rest.last().is_some_and(|t| VISIBILITY.contains(t)) {
            rest.pop();
        }

        let (section, size) = match rest.as_slice() {
            [] => (None, None),
            [section, size] if is_section(section) && is_hex(size) => {
                (Some(*section), Some(parse_hex(size)?))
            }
            [one] if is_section(one) => (Some(*one), None),
            [one] if is_hex(one) => (None, Some(parse_hex(one)?)),
            _ => return None,
        };

        Some(Self { address, marker, section, size, name })
    }

    pub fn is_function(&self) -> bool {
        self.marker == 'F'
    }

    pub fn is_data(&self) -> bool {
        DATA_MARKERS.contains(&self.marker)
    }
}

fn is_hex(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_flag_token(token: &str) -> bool {
    let mut chars = token.chars();
    let Some(last) = chars.next_back() else {
        return false;
    };
    token.len() <= 7
        && chars.all(|c| FLAG_CHARS.contains(c))
        && (FLAG_CHARS.contains(last) || TYPE_ONLY_MARKERS.contains(&last))
}

fn is_section(token: &str) -> bool {
    (token.starts_with('.') || token.starts_with('*')) && !VISIBILITY.contains(&token)
}

/// Collect every function symbol (`F` marker) from a symbol table dump.
///
/// Missing sizes become 0. Rows named `.text` are section echoes, not symbols.
pub fn extract_function_symbols<I, S>(lines: I) -> Vec<FunctionSymbol>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            let row = SymbolLine::parse(line.as_ref())?;
            if !row.is_function() || row.name.is_empty() || row.name == ".text" {
                return None;
            }
            trace!("function symbol {} at {:#x}", row.name, row.address);
            Some(FunctionSymbol {
                name: row.name.to_string(),
                address: row.address,
                size: row.size.unwrap_or(0),
            })
        })
        .collect()
}

/// Collect globals and statics living in `.data`, `.bss` or `.rodata`.
pub fn extract_data_symbols<I, S>(lines: I) -> Vec<DataSymbol>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            let row = SymbolLine::parse(line.as_ref())?;
            if !row.is_data() {
                return None;
            }
            let section = row.section.and_then(DataSection::from_label)?;
            Some(DataSymbol {
                name: row.name.to_string(),
                address: row.address,
                size: row.size.unwrap_or(0),
                section,
            })
        })
        .collect()
}
