//! CLI argument definitions for record-cleaner.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "record-cleaner",
    version,
    about = "Record Cleaner - Validate and verify biological records",
    long_about = "Check a spreadsheet of biological records against the record cleaner service.\n\n\
                  Validation checks dates, taxa and spatial references; verification \n\
                  applies the rules of the chosen organisation groups to a validated file.\n\
                  Results are written to a CSV file next to the input."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Service configuration file (default: platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include record values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the columns of an input file.
    Columns {
        /// CSV or spreadsheet file.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Create or inspect session files.
    #[command(subcommand)]
    Session(SessionCommand),

    /// Check whether the service is available.
    Status,

    /// List the verification rules offered by the service.
    Rules {
        /// Fetch the list again even if a cached copy is fresh.
        #[arg(long = "refresh")]
        refresh: bool,
    },

    /// Validate the records in a file.
    Validate(RunArgs),

    /// Verify the records in a validated file.
    Verify(RunArgs),
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Write a session file with columns suggested from the file header.
    Init {
        /// CSV or spreadsheet file.
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Where to write the session.
        #[arg(long = "out", value_name = "SESSION")]
        out: PathBuf,

        /// Replace an existing session file.
        #[arg(long = "force")]
        force: bool,
    },

    /// Show the mapping a session file produces.
    Show {
        #[arg(value_name = "SESSION")]
        session: PathBuf,
    },
}

#[derive(Parser)]
pub struct RunArgs {
    /// Input file: the upload for validate, the validation result for verify.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Session file describing the column mapping.
    #[arg(long = "session", value_name = "SESSION")]
    pub session: PathBuf,

    /// Records per service call (overrides the configuration file).
    #[arg(long = "batch-size", value_name = "N")]
    pub batch_size: Option<usize>,

    /// Hide the progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
