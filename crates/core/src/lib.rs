//! objdump-analyzer-core
//!
//! Core library for extracting simple facts from the textual output of
//! objdump and binutils `size`: function address ranges from disassembly
//! headers, function and data symbol sizes from a symbol table dump, and
//! disassembly lines that touch a configured set of registers.
//!
//! Tools are never invoked directly by the parsers. A [`backends::DumpSource`]
//! produces the text lines, which keeps every extractor testable with canned
//! input and reusable from other frontends.

pub mod model;
pub mod analysis;
pub mod backends;
pub mod run;
pub mod services;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
