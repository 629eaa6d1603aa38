//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Compiles component-scoped stylesheets.
#[derive(Debug, Parser)]
#[command(name = "scoped-styles")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Root directory of the component sources
    #[arg(long, default_value = ".")]
    pub workspace: Utf8PathBuf,

    /// Output directory, relative to the workspace [default: build]
    #[arg(long = "out-dir")]
    pub out_dir: Option<Utf8PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Minimum severity threshold
    #[arg(long, value_enum, default_value = "warning")]
    pub threshold: Threshold,

    /// Keep class and id names as written
    #[arg(long = "no-scope")]
    pub no_scope: bool,

    /// Exit with error on warnings
    #[arg(long = "fail-on-warnings")]
    pub fail_on_warnings: bool,

    /// Warn about variable usages with no definition and no default
    #[arg(long = "report-unresolved")]
    pub report_unresolved: bool,

    /// Log every class and id rewrite
    #[arg(long)]
    pub trace: bool,

    /// Write compact CSS instead of one declaration per line
    #[arg(long)]
    pub compact: bool,

    /// Glob patterns to ignore
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Component file extensions (comma-separated) [default: .html]
    #[arg(long, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Path to the config file [default: <workspace>/scoped-styles.json]
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// Human-readable with code snippets
    HumanVerbose,
    /// JSON output
    Json,
    /// Machine-readable (one line per message)
    Machine,
}

/// Severity threshold.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum Threshold {
    /// Only show errors
    Error,
    /// Show errors and warnings (default)
    #[default]
    Warning,
}
