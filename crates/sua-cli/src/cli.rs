//! CLI argument definitions for the regulatory file validator.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use sua_schema::FileType;

#[derive(Parser)]
#[command(
    name = "sua",
    version,
    about = "Fixed-width regulatory file validator",
    long_about = "Validate fixed-width regulatory data files against the built-in\n\
                  schemas and rule sets.\n\n\
                  Supports payroll contribution, bank dispersion and worker\n\
                  registry file types; rule sets can be extended with JSON\n\
                  configuration without recompiling."
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

    /// Allow worker identifier values in logs and console output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a fixed-width regulatory file.
    Validate(ValidateArgs),

    /// List the built-in file types and their record layouts.
    Schemas,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Path to the fixed-width file to validate.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Declared file type of the input.
    #[arg(long = "file-type", value_enum)]
    pub file_type: FileTypeArg,

    /// Additional rule set (JSON) merged with the built-in rules.
    #[arg(long = "rules", value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Directory for the machine-readable validation report.
    #[arg(long = "report-dir", value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Evaluation date (YYYY-MM-DD) anchoring not-in-the-future checks;
    /// defaults to today.
    #[arg(long = "evaluation-date", value_name = "DATE")]
    pub evaluation_date: Option<NaiveDate>,

    /// Flag lines longer than the declared layout instead of tolerating
    /// trailing filler.
    #[arg(long = "strict-length")]
    pub strict_length: bool,

    /// Maximum violations listed in the console summary.
    #[arg(long = "max-violations", value_name = "N", default_value_t = 50)]
    pub max_violations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileTypeArg {
    PayrollContribution,
    BankDispersion,
    WorkerRegistry,
}

impl From<FileTypeArg> for FileType {
    fn from(value: FileTypeArg) -> Self {
        match value {
            FileTypeArg::PayrollContribution => FileType::PayrollContribution,
            FileTypeArg::BankDispersion => FileType::BankDispersion,
            FileTypeArg::WorkerRegistry => FileType::WorkerRegistry,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
