//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// powerplan: sample size planning for two-group experiments
#[derive(Parser)]
#[command(name = "powerplan")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an interactive planning session
    Plan {
        /// Directory for the sweep table and graph (created if missing)
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,

        /// Skip writing the sweep table
        #[arg(long)]
        no_table: bool,

        /// Skip writing the sweep graph
        #[arg(long)]
        no_graph: bool,
    },

    /// List the supported design branches
    Designs,
}
