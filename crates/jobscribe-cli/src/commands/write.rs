//! Write command implementation.
//!
//! Writes a workflow's inline submit descriptions and then its DAGMan
//! input file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use super::common::load_dag;

/// Execute the write command.
pub fn execute(input: &str, output_dir: Option<&str>) -> Result<()> {
    let base_dir = output_dir.map(Path::new);

    if let Some(dir) = base_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let mut dag = load_dag(input, base_dir)?;

    println!(
        "{} Writing {} ({} nodes)",
        style("→").cyan().bold(),
        style(dag.filename.display()).green(),
        dag.len()
    );

    dag.dump()
        .with_context(|| format!("Failed to write workflow {}", dag.filename.display()))?;

    for node in &dag.nodes {
        if let Some(submit) = node.submit_description.as_inline() {
            println!(
                "  {} {}",
                style(&node.name).yellow(),
                submit.filename.display()
            );
        }
    }

    println!(
        "{} Wrote {}",
        style("✓").green().bold(),
        style(dag.filename.display()).cyan()
    );

    Ok(())
}
