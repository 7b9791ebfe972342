//! Render command implementation.

use std::collections::HashSet;

use anyhow::Result;
use console::style;

use super::common::load_dag;

/// Execute the render command.
pub fn execute(input: &str, show_submit: bool) -> Result<()> {
    let dag = load_dag(input, None)?;

    if show_submit {
        println!("{}", style(format!("# {}", dag.filename.display())).dim());
    }
    println!("{dag}");

    if show_submit {
        let mut seen = HashSet::new();
        for submit in dag
            .nodes
            .iter()
            .filter_map(|node| node.submit_description.as_inline())
        {
            if !seen.insert(submit.filename.clone()) {
                continue;
            }
            println!();
            println!("{}", style(format!("# {}", submit.filename.display())).dim());
            println!("{submit}");
        }
    }

    Ok(())
}
