//! CLI argument definitions for the holoframe tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "holoframe",
    version,
    about = "Summarize cell x trial x time recording tables",
    long_about = "Summarize long-form recording tables (one row per cell, trial and timepoint).\n\n\
                  Attaches trial-wise and cell-wise annotation tables, then computes grouped\n\
                  temporal means over the whole trace, a window, or a baselined window."
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
    /// Compute grouped temporal means of a recording table.
    Summarize(SummarizeArgs),

    /// Print cell, trial and timepoint counts of a recording table.
    Describe(DescribeArgs),
}

#[derive(Parser)]
pub struct SummarizeArgs {
    /// Long-form CSV with cell, trial, time and value columns.
    #[arg(value_name = "TABLE_CSV")]
    pub table: PathBuf,

    /// Grouping column, outermost first (repeatable).
    #[arg(long = "by", value_name = "COL", required = true)]
    pub by: Vec<String>,

    /// Column to average.
    #[arg(long = "value", value_name = "COL", default_value = "value")]
    pub value: String,

    /// Time window bounds: `lo,hi` or `base_lo,base_hi,resp_lo,resp_hi`.
    ///
    /// Bounds are exclusive. With four bounds the baseline mean is subtracted
    /// from the response mean per group.
    #[arg(long = "window", value_name = "BOUNDS", allow_hyphen_values = true)]
    pub window: Option<String>,

    /// Spread the last grouping column across output columns.
    #[arg(long = "wide")]
    pub wide: bool,

    /// Per-trial annotation CSV (a `trial` column holds explicit keys).
    #[arg(long = "trialwise", value_name = "CSV")]
    pub trialwise: Option<PathBuf>,

    /// Per-cell annotation CSV (a `cell` column holds explicit keys).
    #[arg(long = "cellwise", value_name = "CSV")]
    pub cellwise: Option<PathBuf>,

    /// Overwrite existing columns when attaching annotations.
    #[arg(long = "replace")]
    pub replace: bool,

    /// Sampling rate in Hz; adds a `seconds` column before summarizing.
    #[arg(long = "frame-rate", value_name = "HZ")]
    pub frame_rate: Option<f64>,

    /// Write the result as CSV instead of printing a table.
    #[arg(long = "output", value_name = "CSV")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct DescribeArgs {
    /// Long-form CSV with cell, trial, time and value columns.
    #[arg(value_name = "TABLE_CSV")]
    pub table: PathBuf,
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
