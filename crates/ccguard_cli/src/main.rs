//! ccguard CLI: checks C++ translation units against the coding standard.
//!
//! Provides `ccguard check` to run the checks over JSON translation-unit
//! dumps exported by a compiler front end, and `ccguard list-checks` to show
//! the registered checks and how the configuration treats them.

#![warn(missing_docs)]

mod check;
mod error;
mod list;
mod pipeline;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// ccguard: coding-standard checks for C++.
#[derive(Parser, Debug)]
#[command(name = "ccguard", version, about = "C++ coding-standard checker")]
pub struct Cli {
    /// Suppress all output except diagnostics and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `ccguard.toml` file, or a directory containing one.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check translation-unit dumps.
    Check(CheckArgs),
    /// List the registered checks.
    ListChecks {
        /// Output format.
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

/// Arguments for the `ccguard check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// JSON translation-unit dumps to check.
    #[arg(required = true)]
    pub units: Vec<PathBuf>,

    /// Checks to skip, by name or code (e.g., `--allow auto E302`).
    #[arg(long, num_args = 1..)]
    pub allow: Vec<String>,

    /// Checks whose findings are errors (e.g., `--deny derived-classes`).
    #[arg(long, num_args = 1..)]
    pub deny: Vec<String>,

    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when stderr is a terminal.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether debug logging is on.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a configuration file or directory.
    pub config: Option<String>,
}

fn init_tracing(global: &GlobalArgs) {
    let default = if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };
    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::Check(ref args) => check::run(args, &global),
        Command::ListChecks { format } => list::run(format, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    }
}
