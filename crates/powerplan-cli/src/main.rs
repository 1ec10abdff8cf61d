//! powerplan CLI - interactive sample size planning.

mod cli;
mod commands;
mod console;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Plan {
            output_dir,
            json,
            no_table,
            no_graph,
        } => commands::plan::run(output_dir, json, !no_table, !no_graph, cli.verbose),

        Commands::Designs => commands::designs::run(cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so prompts and reports on stdout stay clean.
///
/// `RUST_LOG` overrides the level picked by `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
