//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - job-submission files for HTCondor/DAGMan and SLURM",
        style("jobscribe").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Artifacts:");
    println!("  submit   HTCondor submit descriptions");
    println!("  dag      DAGMan input files");
    println!("  sbatch   SLURM batch scripts");
    println!();
    println!("License:    {}", style("GPL-3.0-only").dim());
}
