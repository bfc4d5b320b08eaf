// src/cli.rs
//! CLI definitions for ruleport
//!
//! Command implementations live in `main.rs`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ruleport")]
#[command(author = "Ruleport Contributors")]
#[command(version)]
#[command(about = "Convert legacy build modules into configurable build rules", long_about = None)]
pub struct Cli {
    /// Converter options file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a module graph and write the rules as JSON
    Convert {
        /// Module graph file (.toml or .json)
        graph: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop at the first module that fails to convert
        #[arg(long)]
        fail_fast: bool,
    },

    /// Convert a module graph and report errors only
    Check {
        /// Module graph file (.toml or .json)
        graph: PathBuf,
    },

    /// List the modules of a graph and the rules each converts to
    Modules {
        /// Module graph file (.toml or .json)
        graph: PathBuf,
    },
}
