use regex::RegexSet;

use super::trim_newline;
use crate::model::RegisterMatch;

/// Identifier characters; a register token must not touch one on either side.
const WORD_CHARS: &str = "A-Za-z0-9_";

/// Whole-word, case-sensitive matcher over a fixed list of register names.
///
/// Register spellings are escaped before compilation, so `$sp` or `x[1]`
/// match literally. The filter carries no state between lines.
#[derive(Debug, Clone)]
pub struct RegisterFilter {
    registers: Vec<String>,
    set: RegexSet,
}

impl RegisterFilter {
    pub fn new<I, S>(registers: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registers: Vec<String> = registers.into_iter().map(Into::into).collect();
        let patterns = registers.iter().map(|reg| whole_word_pattern(reg));
        let set = RegexSet::new(patterns)?;
        Ok(Self { registers, set })
    }

    pub fn registers(&self) -> &[String] {
        &self.registers
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// First configured register (in configuration order) found in `line`.
    pub fn find(&self, line: &str) -> Option<&str> {
        self.set.matches(line).iter().next().map(|idx| self.registers[idx].as_str())
    }

    /// Report `line` once if any register occurs in it.
    pub fn check(&self, line: &str) -> Option<RegisterMatch> {
        let line = trim_newline(line);
        self.find(line).map(|register| RegisterMatch {
            register: register.to_string(),
            line: line.to_string(),
        })
    }

    /// Every matching line of a buffered dump, in input order.
    pub fn filter<I, S>(&self, lines: I) -> Vec<RegisterMatch>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines.into_iter().filter_map(|line| self.check(line.as_ref())).collect()
    }
}

fn whole_word_pattern(register: &str) -> String {
    format!("(?:^|[^{WORD_CHARS}]){}(?:$|[^{WORD_CHARS}])", regex::escape(register))
}
