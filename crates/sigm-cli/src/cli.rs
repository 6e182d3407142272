//! CLI argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use sigm_codegen::GeneratorKind;

#[derive(Parser)]
#[command(
    name = "sigm",
    version,
    about = "Signal manager configuration tool",
    long_about = "Inspect, validate and convert signal manager projects.\n\n\
                  Projects are JSON files; the interchange format is a workbook with\n\
                  Version, Config and LookUpTable sheets. Code generation writes the\n\
                  signal manager C sources or runs the IPC generator scripts."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

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

    /// Treat this date (YYYY-MM-DD) as today when validating.
    #[arg(long = "reference-date", value_name = "DATE", global = true)]
    pub reference_date: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the platform and signal tables of a project.
    Show(ShowArgs),

    /// Validate a project and list the issues found.
    Validate(ShowArgs),

    /// Write a project as an interchange workbook.
    Export(ExportArgs),

    /// Read an interchange workbook and save it as a project.
    Import(ImportArgs),

    /// Generate code from a project.
    Generate(GenerateArgs),
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Project file.
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Project file.
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,

    /// Workbook to write.
    #[arg(value_name = "XLSX")]
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct ImportArgs {
    /// Workbook to read.
    #[arg(value_name = "XLSX")]
    pub input: PathBuf,

    /// Project file to write.
    #[arg(value_name = "PROJECT")]
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct GenerateArgs {
    /// Project file.
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,

    /// Which generator to run.
    #[arg(long = "kind", value_enum, default_value = "signal-mgr")]
    pub kind: KindArg,

    /// Directory for generated files.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Generator script (IPC kinds only; overrides the project setting).
    #[arg(long = "script", value_name = "PATH")]
    pub script: Option<PathBuf>,
}

/// Generator choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    SignalMgr,
    IpcManager,
    IpcEthMgr,
}

impl From<KindArg> for GeneratorKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::SignalMgr => GeneratorKind::SignalMgr,
            KindArg::IpcManager => GeneratorKind::IpcManager,
            KindArg::IpcEthMgr => GeneratorKind::IpcEthMgr,
        }
    }
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
