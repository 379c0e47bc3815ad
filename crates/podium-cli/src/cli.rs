//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Speaking-time tracker for live events.
///
/// Tracks per-participant speaking segments, aggregates them into live
/// totals, checks role-specific minimum-time thresholds, and exports the
/// session as CSV or an aligned text table.
#[derive(Debug, Parser)]
#[command(name = "podium", version, about, long_about = None)]
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
    /// Run an interactive timing session.
    Run {
        /// Minimum speaking minutes for speakers, overriding the config.
        #[arg(long, value_name = "MINUTES")]
        speaker_min: Option<u32>,

        /// Minimum speaking minutes for discussants, overriding the config.
        #[arg(long, value_name = "MINUTES")]
        discussant_min: Option<u32>,

        /// Directory export files are written to, overriding the config.
        #[arg(long, value_name = "DIR")]
        export_dir: Option<PathBuf>,
    },

    /// Write a starter config file to the platform config directory.
    Init,
}
