//! Record Cleaner CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use rc_cli::config::AppConfig;
use rc_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, SessionCommand};
use crate::commands::{
    run_columns, run_rules, run_session_init, run_session_show, run_status, run_validate,
    run_verify,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let load_config = || AppConfig::load(cli.config.as_deref());
    match &cli.command {
        Command::Columns { file } => run_columns(file).map(|()| 0),
        Command::Session(SessionCommand::Init { file, out, force }) => {
            run_session_init(file, out, *force).map(|()| 0)
        }
        Command::Session(SessionCommand::Show { session }) => run_session_show(session).map(|()| 0),
        Command::Status => {
            let available = run_status(&load_config()?)?;
            Ok(if available { 0 } else { 1 })
        }
        Command::Rules { refresh } => run_rules(&load_config()?, *refresh).map(|()| 0),
        Command::Validate(args) => {
            let summary = run_validate(args, &load_config()?)?;
            Ok(if summary.success { 0 } else { 1 })
        }
        Command::Verify(args) => {
            let summary = run_verify(args, &load_config()?)?;
            Ok(if summary.success { 0 } else { 1 })
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig::default()
        .with_level(cli.verbosity.tracing_level_filter())
        .with_log_file(cli.log_file.clone())
        .with_log_data(cli.log_data);
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
