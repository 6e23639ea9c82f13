use std::sync::OnceLock;

use log::trace;
use regex::Regex;

use super::{parse_hex, trim_newline};
use crate::model::FunctionRange;

/// `80000100 <my_function>:`
fn header_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9a-fA-F]+) <(.+)>:$").expect("valid header pattern"))
}

/// `80000100:	13 01 00 00 	addi	x2,x2,0`
fn instruction_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([0-9a-fA-F]+):\s+[0-9a-fA-F]{2,}").expect("valid instruction pattern")
    })
}

/// Incremental function-boundary detector.
///
/// Feed it disassembly lines with [`push`](Self::push); a finished
/// [`FunctionRange`] is returned whenever a new header closes the previous
/// function. Call [`finish`](Self::finish) at end of input to close the last
/// one. The extractor holds no state shared with other instances, so several
/// dumps can be scanned independently.
#[derive(Debug, Default)]
pub struct FunctionRangeExtractor {
    current: Option<FunctionRange>,
    last_addr: u64,
}

impl FunctionRangeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the function currently being tracked, if any.
    pub fn current_function(&self) -> Option<&str> {
        self.current.as_ref().map(|f| f.name.as_str())
    }

    /// Classify one line. Returns the previous function when `line` is a
    /// header that closes it.
    pub fn push(&mut self, line: &str) -> Option<FunctionRange> {
        let line = trim_newline(line);

        if let Some(caps) = header_pattern().captures(line) {
            let start = parse_hex(&caps[1])?;
            let closed = self.close();
            trace!("function header {} at {:#x}", &caps[2], start);
            self.current = Some(FunctionRange::opened(&caps[2], start));
            self.last_addr = start;
            return closed;
        }

        if self.current.is_some() {
            let addr = instruction_pattern().captures(line).and_then(|c| parse_hex(&c[1]));
            if let Some(addr) = addr {
                self.last_addr = addr;
            }
        }
        None
    }

    /// Close the open function, if any, at the last seen instruction address.
    pub fn finish(mut self) -> Option<FunctionRange> {
        self.close()
    }

    fn close(&mut self) -> Option<FunctionRange> {
        self.current.take().map(|f| f.close_at(self.last_addr))
    }
}

/// Fold a whole disassembly dump into function ranges, in header order.
pub fn extract_function_ranges<I, S>(lines: I) -> Vec<FunctionRange>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut extractor = FunctionRangeExtractor::new();
    let mut functions: Vec<FunctionRange> =
        lines.into_iter().filter_map(|line| extractor.push(line.as_ref())).collect();
    functions.extend(extractor.finish());
    functions
}
