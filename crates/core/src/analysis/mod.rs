//! Line-oriented extraction over objdump and `size` output.
//!
//! Each extractor takes lines in dump order and never fails: lines that do not
//! fit the expected shape are skipped, and an empty input yields an empty list.

pub mod functions;
pub mod registers;
pub mod sizes;
pub mod symbols;

pub use functions::{extract_function_ranges, FunctionRangeExtractor};
pub use registers::RegisterFilter;
pub use sizes::parse_size_report;
pub use symbols::{extract_data_symbols, extract_function_symbols, SymbolLine};

/// Parse a hex address/size token, tolerating an optional `0x` prefix.
pub(crate) fn parse_hex(token: &str) -> Option<u64> {
    let digits = token.strip_prefix("0x").unwrap_or(token);
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

/// Strip the line terminator left behind by readers that keep it.
pub(crate) fn trim_newline(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
