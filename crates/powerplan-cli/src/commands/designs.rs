//! Designs command - list every branch of the decision tree.

use colored::Colorize;
use powerplan::design::{LEAVES, Selectable};

pub fn run(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "Supported designs".cyan().bold());
    println!();

    for spec in LEAVES.iter() {
        println!(
            "{}  {}",
            spec.leaf.artifact_stem().white().bold(),
            spec.leaf.title()
        );
        println!(
            "    selectors: test={} design={} method={}",
            selector(spec.test),
            selector(spec.design),
            selector(spec.method)
        );
        println!(
            "    sweep: {} -> {}",
            spec.axis.label(),
            spec.axis.value_label()
        );

        if verbose {
            let params: Vec<_> = spec.leaf.required_params().iter().map(|p| p.key()).collect();
            println!("    parameters: {}", params.join(", ").dimmed());
        }
    }

    Ok(())
}

/// 1-based menu position of an option.
fn selector<T: Selectable + PartialEq>(value: T) -> usize {
    T::OPTIONS
        .iter()
        .position(|o| *o == value)
        .map_or(0, |i| i + 1)
}
