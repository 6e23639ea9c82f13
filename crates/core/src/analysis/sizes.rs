//! Berkeley-format output of binutils `size`:
//!
//! ```text
//!    text    data     bss     dec     hex filename
//!    1234     567      89    1890     762 test.elf
//! ```

use super::trim_newline;
use crate::model::SizeRow;

/// Parse every data row; the header and anything malformed are skipped.
pub fn parse_size_report<I, S>(lines: I) -> Vec<SizeRow>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines.into_iter().filter_map(|line| parse_row(line.as_ref())).collect()
}

fn parse_row(line: &str) -> Option<SizeRow> {
    let mut cols = trim_newline(line).split_whitespace();
    let text = cols.next()?.parse().ok()?;
    let data = cols.next()?.parse().ok()?;
    let bss = cols.next()?.parse().ok()?;
    let total = cols.next()?.parse().ok()?;
    let _hex = cols.next()?;
    let filename = cols.collect::<Vec<_>>().join(" ");
    if filename.is_empty() {
        return None;
    }
    Some(SizeRow { text, data, bss, total, filename })
}
