//! CLI argument definitions using clap
//!
//! supercheck is a single-purpose hook tool, so the surface is a flat
//! parser rather than subcommands: file paths plus a handful of flags.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Check that super() is the last call in unittest setUp/tearDown methods
#[derive(Parser, Debug)]
#[command(name = "supercheck")]
#[command(about = "Check that super() is the last call in unittest setUp/tearDown methods")]
#[command(version)]
pub struct Cli {
    /// Python files to check
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// Auto-correct violations in place
    #[arg(long)]
    pub fix: bool,

    /// Print per-file timing to stderr
    #[arg(long)]
    pub profile: bool,

    /// Output format for violations
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: OutputFormat,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options
#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// One `<path>:<line>: <message>` line per violation (default)
    #[default]
    Text,
    /// JSON array of violation records for machine parsing
    Json,
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
