//! Signal manager CLI.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::{ColorChoice, Parser};
use sigm_cli::commands::{run_export, run_generate, run_import, run_show, run_validate};
use sigm_cli::logging::{LogConfig, LogFormat, init_logging};
use sigm_cli::summary::{print_artifacts, print_import, print_issues, print_project};
use sigm_core::SessionError;
use tracing::level_filters::LevelFilter;

mod cli;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    let date = cli.reference_date;
    let result = match cli.command {
        Command::Show(args) => run_show(&args.project).map(|project| {
            print_project(&project);
            true
        }),
        Command::Validate(args) => run_validate(&args.project, date).map(|report| {
            print_issues(&report.issues);
            !report.has_errors()
        }),
        Command::Export(args) => run_export(&args.project, &args.output, date).map(|()| {
            println!("Exported {}", args.output.display());
            true
        }),
        Command::Import(args) => run_import(&args.input, &args.output, date).map(|summary| {
            print_import(&summary);
            true
        }),
        Command::Generate(args) => run_generate(
            &args.project,
            args.kind.into(),
            &args.output_dir,
            args.script.as_deref(),
            date,
        )
        .map(|artifacts| {
            print_artifacts(&artifacts);
            true
        }),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            if let Some(SessionError::Invalid(issues)) = error.downcast_ref::<SessionError>() {
                print_issues(issues);
            }
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
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
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
