//! CLI argument definitions for the XLSForm data validator.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "xform",
    version,
    about = "XLSForm data validator - check survey responses against a form schema",
    long_about = "Validate tabular survey-response data against an XLSForm-style schema.\n\n\
                  Reports every invalid cell with its row, column, question, and the\n\
                  reason, and can write a JSON report plus a highlighted copy of the\n\
                  data with the offending cells flagged."
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a response sheet against a form schema.
    Validate(ValidateArgs),
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Response data to validate (CSV, header row first).
    #[arg(value_name = "DATA_CSV")]
    pub data: PathBuf,

    /// Survey sheet of the form (type, name, label, required, constraint, ...).
    #[arg(long = "survey", value_name = "CSV")]
    pub survey: PathBuf,

    /// Choices sheet of the form (list_name, name, label, alias).
    #[arg(long = "choices", value_name = "CSV")]
    pub choices: PathBuf,

    /// Write the full error report as JSON.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,

    /// Write a copy of the data with invalid cells flagged, plus an error sheet.
    #[arg(long = "highlight", value_name = "PATH")]
    pub highlight: Option<PathBuf>,

    /// Maximum number of errors to print to the terminal.
    #[arg(long = "max-shown", value_name = "N", default_value_t = 50)]
    pub max_shown: usize,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn validate_args_parse() {
        let cli = Cli::parse_from([
            "xform",
            "validate",
            "data.csv",
            "--survey",
            "survey.csv",
            "--choices",
            "choices.csv",
            "--report-json",
            "report.json",
        ]);
        let Command::Validate(args) = cli.command;
        assert_eq!(args.data.to_string_lossy(), "data.csv");
        assert_eq!(args.report_json.as_deref().map(|p| p.to_string_lossy().into_owned()), Some("report.json".to_string()));
        assert_eq!(args.max_shown, 50);
    }
}
