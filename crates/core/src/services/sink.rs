use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::model::RegisterMatch;

/// Destination for register-filter hits.
///
/// The caller owns the sink and decides where matches go (a file per run,
/// stdout, memory). [`finish`](Self::finish) must be called once the stream
/// ends so buffered output is flushed and write errors surface.
pub trait RegisterSink {
    fn record(&mut self, hit: &RegisterMatch) -> io::Result<()>;

    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes each matching line, verbatim, to any [`Write`].
pub struct WriterSink<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<BufWriter<File>> {
    /// Create (truncate) a file sink at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> RegisterSink for WriterSink<W> {
    fn record(&mut self, hit: &RegisterMatch) -> io::Result<()> {
        writeln!(self.writer, "{}", hit.line)?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Keeps every hit in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub matches: Vec<RegisterMatch>,
}

impl RegisterSink for MemorySink {
    fn record(&mut self, hit: &RegisterMatch) -> io::Result<()> {
        self.matches.push(hit.clone());
        Ok(())
    }
}
