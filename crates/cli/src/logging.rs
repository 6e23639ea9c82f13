//! Logger setup for the CLI.
//!
//! Console logging goes to stderr so stdout stays parseable (`--json`). An
//! `analyze` run additionally writes its log to the run's log file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Logger, Target};
use log::{LevelFilter, Log, Metadata, Record};

/// Map `-v`/`-q` flags to a console level. Default shows warnings and errors.
pub fn level_from_flags(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initialise the global logger at `level`, writing to stderr.
pub fn init(level: LevelFilter) -> Result<()> {
    let mut builder = builder(level);
    builder.target(Target::Stderr);
    builder.try_init().context("Logger already initialised")
}

/// Initialise the global logger writing to stderr at `level` and to `path`
/// (created/truncated). The file records at least `info`, regardless of
/// console verbosity.
pub fn init_with_file(level: LevelFilter, path: &Path) -> Result<()> {
    let logger = RunLogger::new(level, path)?;
    let max = logger.max_level();
    log::set_boxed_logger(Box::new(logger)).context("Logger already initialised")?;
    log::set_max_level(max);
    Ok(())
}

/// Sends each record to the console and to a run's log file, each behind its
/// own level filter.
struct RunLogger {
    console: Logger,
    file: Logger,
}

impl RunLogger {
    fn new(level: LevelFilter, path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        let console = builder(level).target(Target::Stderr).build();
        let file = builder(level.max(LevelFilter::Info))
            .target(Target::Pipe(Box::new(file)))
            .build();
        Ok(Self { console, file })
    }

    fn max_level(&self) -> LevelFilter {
        self.console.filter().max(self.file.filter())
    }
}

impl Log for RunLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console.enabled(metadata) || self.file.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        self.console.log(record);
        self.file.log(record);
    }

    fn flush(&self) {
        self.console.flush();
        self.file.flush();
    }
}

fn builder(level: LevelFilter) -> Builder {
    let mut builder = Builder::from_default_env();
    builder.filter_level(level).format(|buf, record| {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        writeln!(buf, "[{}] {:>5} {}", timestamp, record.level(), record.args())
    });
    builder
}
