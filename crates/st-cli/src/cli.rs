//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Hourly app usage reports.
///
/// Reconstructs foreground sessions from a platform usage-event dump and
/// reports per-application usage broken down by hour of day.
#[derive(Debug, Parser)]
#[command(name = "st", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Per-application hourly usage report for one day.
    Report {
        /// Events dump file (JSON array of transition events).
        #[arg(long)]
        events: Option<PathBuf>,

        /// Daily totals file (JSON array of per-app aggregates).
        #[arg(long)]
        totals: Option<PathBuf>,

        /// Display-name table file (JSON object, package to name).
        #[arg(long)]
        names: Option<PathBuf>,

        /// Day to report on (YYYY-MM-DD, local). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output JSON instead of the human-readable report.
        #[arg(long)]
        json: bool,
    },

    /// Dump the reconstructed foreground sessions for one day.
    Sessions {
        /// Events dump file (JSON array of transition events).
        #[arg(long)]
        events: Option<PathBuf>,

        /// Day to inspect (YYYY-MM-DD, local). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output JSON instead of the human-readable listing.
        #[arg(long)]
        json: bool,
    },
}
