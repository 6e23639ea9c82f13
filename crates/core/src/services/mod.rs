//! Aggregation of extractor output into a run, plus report writers.

pub mod analysis;
pub mod report;
pub mod sink;

pub use analysis::{AnalysisReport, Analyzer};
pub use sink::{MemorySink, RegisterSink, WriterSink};
