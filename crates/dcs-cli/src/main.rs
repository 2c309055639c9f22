//! Dental Chart Studio CLI.

use clap::{ColorChoice, Parser};
use dcs_cli::config::CliConfig;
use dcs_cli::logging::{LogConfig, LogFormat, init_logging};
use dcs_persistence::FileStore;
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod output;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    Workspace, run_apply, run_conditions, run_dictate, run_layout, run_mode, run_note,
    run_patients, run_scene, run_session, run_show, run_snapshot,
};
use crate::output::print_session_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let workspace = match workspace_from_cli(&cli) {
        Ok(workspace) => workspace,
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    };
    let result = match &cli.command {
        Command::Conditions => run_conditions().map(|()| 0),
        Command::Layout(args) => run_layout(args).map(|()| 0),
        Command::Patients => run_patients(&workspace).map(|()| 0),
        Command::Show(args) => run_show(&workspace, args).map(|()| 0),
        Command::Apply(args) => run_apply(&workspace, args).map(|()| 0),
        Command::Note(args) => run_note(&workspace, args).map(|()| 0),
        Command::Mode(args) => run_mode(&workspace, args).map(|()| 0),
        Command::Session(args) => run_session(&workspace, args).map(|summary| {
            print_session_summary(&summary);
            if summary.rejected.is_empty() { 0 } else { 2 }
        }),
        Command::Dictate(args) => {
            run_dictate(&workspace, args).map(|clean| if clean { 0 } else { 2 })
        }
        Command::Scene(args) => run_scene(&workspace, args).map(|()| 0),
        Command::Snapshot(command) => run_snapshot(&workspace, command).map(|()| 0),
    };
    let exit_code = match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Load the config file and apply flag overrides.
fn workspace_from_cli(cli: &Cli) -> anyhow::Result<Workspace> {
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(policy) = cli.load_policy {
        config.chart.load_policy = policy.into();
    }
    Ok(Workspace {
        store: FileStore::new(&cli.store_dir),
        config,
    })
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
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
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
