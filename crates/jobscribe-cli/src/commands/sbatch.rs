//! Sbatch command implementation.

use anyhow::{Context, Result};
use console::style;

use jobscribe::SbatchSubmit;

use super::common::parse_key_value;

/// Arguments of the sbatch command.
pub struct SbatchArgs {
    pub output: String,
    pub executable: String,
    pub arguments: String,
    pub options: Vec<String>,
    pub transfer_executable: bool,
    pub input_files: Vec<String>,
    pub output_files: Vec<String>,
}

/// Build the batch description from command-line arguments.
pub fn build(args: &SbatchArgs) -> Result<SbatchSubmit> {
    let mut submit = SbatchSubmit::new(&args.output, &args.executable)
        .with_arguments(args.arguments.clone());

    for option in &args.options {
        let (key, value) = parse_key_value(option)?;
        submit.options.insert(key, value);
    }

    submit.transfer_executable = args.transfer_executable;
    submit.transfer_input_files = args.input_files.iter().map(Into::into).collect();
    submit.transfer_output_files = args.output_files.iter().map(Into::into).collect();

    Ok(submit)
}

/// Execute the sbatch command.
pub fn execute(args: &SbatchArgs) -> Result<()> {
    let mut submit = build(args)?;

    submit
        .dump()
        .with_context(|| format!("Failed to write batch script {}", args.output))?;

    println!(
        "{} Wrote {} ({} sbatch options)",
        style("✓").green().bold(),
        style(&args.output).cyan(),
        submit.options.len()
    );

    Ok(())
}
