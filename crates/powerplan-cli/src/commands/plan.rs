//! Plan command - run one interactive planning session.

use std::path::PathBuf;

use colored::Colorize;
use powerplan::{Planner, PlannerConfig};

use crate::console::ConsoleAnswers;

pub fn run(
    output_dir: PathBuf,
    json_output: bool,
    export_table: bool,
    export_graph: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&output_dir).map_err(|e| {
        format!(
            "Cannot create output directory {}: {}",
            output_dir.display(),
            e
        )
    })?;

    let config = PlannerConfig::default()
        .with_output_dir(&output_dir)
        .with_export(export_table, export_graph);
    let planner = Planner::with_config(config);

    if !json_output {
        println!("{}", "Sample size planning".cyan().bold());
        println!(
            "Artifacts will be written to {}",
            output_dir.display().to_string().white()
        );
        println!();
    }

    let mut console = ConsoleAnswers::stdin(verbose);
    let report = planner.run(&mut console)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("{}", report.title.yellow().bold());
    println!("{}", report.sentence().green());

    let paths: Vec<_> = report.artifacts.paths().collect();
    if !paths.is_empty() {
        println!();
        println!("{}", "Artifacts:".yellow().bold());
        for path in paths {
            println!("  {}", path.display());
        }
    }

    Ok(())
}
