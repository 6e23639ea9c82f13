use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use objdump_analyzer::commands::{
    analyze_command, functions_command, prepare_run, registers_command, size_command,
    symbols_command, AnalyzeOptions, DumpOptions,
};
use objdump_analyzer::logging;

/// Function, symbol and register-usage analysis over objdump output.
///
/// This CLI is a thin wrapper around `objdump-analyzer-core` (exposed in code
/// as `objdump_analyzer_core`). All parsing lives in the library so it can be
/// tested without binutils installed.
#[derive(Parser, Debug)]
#[command(
    name = "objdump-analyzer",
    version,
    about = "Fast object dump analysis tool",
    long_about = None
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, default_value_t = false, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct JsonFlag {
    /// Emit JSON instead of human-readable text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run objdump on a binary and write a timestamped run directory.
    ///
    /// This will:
    /// - Save `objdump -x -d`, `objdump -t` and `size` output.
    /// - Write function sizes, symbols and data sections to `summary.txt`.
    /// - Write lines using the configured registers to `registers.txt`.
    Analyze(AnalyzeOptions),

    /// List function address ranges from a disassembly.
    Functions {
        #[command(flatten)]
        source: DumpOptions,
        #[command(flatten)]
        out: JsonFlag,
    },

    /// List function symbols (or data-section symbols) from a symbol table.
    Symbols {
        #[command(flatten)]
        source: DumpOptions,

        /// List `.data`/`.bss`/`.rodata` symbols instead of functions.
        #[arg(long, default_value_t = false)]
        data: bool,

        #[command(flatten)]
        out: JsonFlag,
    },

    /// Print disassembly lines that use any of the given registers.
    Registers {
        #[command(flatten)]
        source: DumpOptions,

        /// Register names (whole-word, case-sensitive).
        #[arg(short, long, num_args = 1..)]
        register: Vec<String>,
    },

    /// Show the binutils `size` table.
    Size {
        #[command(flatten)]
        source: DumpOptions,
        #[command(flatten)]
        out: JsonFlag,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = logging::level_from_flags(cli.verbose, cli.quiet);

    match cli.command {
        Command::Analyze(opts) => {
            let ctx = prepare_run(&opts)?;
            logging::init_with_file(level, &ctx.layout.log_path)?;
            analyze_command(&ctx, &opts)?;
        }
        Command::Functions { source, out } => {
            logging::init(level)?;
            functions_command(&source, out.json)?;
        }
        Command::Symbols { source, data, out } => {
            logging::init(level)?;
            symbols_command(&source, data, out.json)?;
        }
        Command::Registers { source, register } => {
            logging::init(level)?;
            registers_command(&source, register)?;
        }
        Command::Size { source, out } => {
            logging::init(level)?;
            size_command(&source, out.json)?;
        }
    }

    Ok(())
}
