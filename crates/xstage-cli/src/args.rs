//! Command-line argument definitions for the xstage CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, the report view and logging verbosity.

use clap::{Parser, ValueEnum};

/// Command-line arguments for the xstage inspection tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input scene document
    #[arg(help = "Path to the input .xstage file")]
    pub input: String,

    /// Path to the output report file; the report goes to stdout when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Section of the scene to report
    #[arg(long, value_enum, default_value_t = View::Summary)]
    pub view: View,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Report sections selectable with `--view`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    /// Scene metadata and counts
    Summary,
    /// Node containment tree with paths
    Tree,
    /// Links of every level
    Links,
    /// Elements declared by the project
    Elements,
    /// Columns and the elements they use
    Columns,
    /// Every section
    All,
}
