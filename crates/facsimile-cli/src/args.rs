//! Command-line argument definitions for the Facsimile CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the elements to copy, where to paste
//! them, input/output paths, configuration file selection and logging
//! verbosity.

use clap::Parser;

/// Command-line arguments for the Facsimile copy/paste tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input diagram (TOML)
    #[arg(help = "Path to the input diagram file")]
    pub input: String,

    /// Path the resulting diagram is written to
    #[arg(short, long, default_value = "out.toml")]
    pub output: String,

    /// Ids of the elements to copy, comma separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub select: Vec<String>,

    /// Element to paste into; defaults to the diagram root
    #[arg(short, long)]
    pub target: Option<String>,

    /// Point the pasted elements are centered on, as `x,y`
    #[arg(long, default_value = "0,0", allow_hyphen_values = true)]
    pub at: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
