//! Run configuration and on-disk output layout.

pub mod config;
pub mod context;
pub mod layout;
pub mod util;

pub use config::AnalyzerConfig;
pub use context::RunContext;
pub use layout::RunLayout;
pub use util::{ensure_directories, file_stem, sha256_file};
