//! SLURM batch script templates.

use std::path::{self, Path, PathBuf};

use crate::error::{DagError, DagResult};
use crate::slurm::submit::SbatchSubmit;

/// Generate the batch script for a single-task job.
///
/// Paths are made absolute against the current directory so the script
/// works from inside its scratch directory. Paths must be valid UTF-8.
pub fn generate_batch_script(submit: &SbatchSubmit) -> DagResult<String> {
    let executable = quoted_absolute(&submit.executable)?;
    let input_files = quoted_absolute_list(&submit.transfer_input_files)?;
    let output_files = quoted_absolute_list(&submit.transfer_output_files)?;

    let mut script = String::new();

    // Shebang
    script.push_str("#!/usr/bin/env bash\n\n");

    // SLURM directives
    script.push_str(&format!("{submit}\n\n"));

    script.push_str("echo \"Working on node `hostname`.\"\n\n");

    // Scratch directory named after the job
    script.push_str("echo 'Create working directory:'\n");
    script.push_str("workdir=$SLURM_JOB_NAME\n");
    script.push_str("mkdir -v $workdir\n");
    script.push_str("cd $workdir\n\n");

    script.push_str(&format!("executable={executable}\n"));
    script.push_str(&format!(
        "transfer_executable={}\n\n",
        submit.transfer_executable
    ));

    script.push_str("if [ \"$transfer_executable\" = \"true\" ]\n");
    script.push_str("then\n");
    script.push_str("    echo 'Transfer executable to node:'\n");
    script.push_str("    cp -v $executable .\n");
    script.push_str("    executable=$PWD/`basename $executable`\n");
    script.push_str("fi\n\n");

    // Stage in
    script.push_str(&format!("inputfiles=({input_files})\n\n"));
    script.push_str("echo 'Transfer input files to node:'\n");
    script.push_str("for inputfile in ${inputfiles[*]}\n");
    script.push_str("do\n");
    script.push_str("    cp -v $inputfile .\n");
    script.push_str("done\n\n");

    // Execute
    script.push_str("echo 'Execute...'\n");
    script.push_str(&format!("$executable {}\n\n", submit.arguments));

    // Stage out
    script.push_str(&format!("outputfiles=({output_files})\n\n"));
    script.push_str("echo 'Transfer output files:'\n");
    script.push_str("for outputfile in ${outputfiles[*]}\n");
    script.push_str("do\n");
    script.push_str("    mv -v `basename $outputfile` $outputfile\n");
    script.push_str("done\n\n");

    // Clean up
    script.push_str("echo 'Remove working directory:'\n");
    script.push_str("cd ..\n");
    script.push_str("rm -rv $workdir\n");

    Ok(script)
}

fn quoted_absolute(path: &Path) -> DagResult<String> {
    let absolute = path::absolute(path)?;
    match absolute.to_str() {
        Some(value) => Ok(shell_quote(value)),
        None => Err(DagError::NonUtf8Path(absolute)),
    }
}

fn quoted_absolute_list(paths: &[PathBuf]) -> DagResult<String> {
    let quoted = paths
        .iter()
        .map(|p| quoted_absolute(p))
        .collect::<DagResult<Vec<_>>>()?;
    Ok(quoted.join(" "))
}

/// Wrap a value in single quotes for bash.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Sanitize a job name for SLURM.
pub(crate) fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(64) // SLURM has a 64 character limit for job names
        .collect()
}

/// Format time in minutes to SLURM time format (D-HH:MM:SS or HH:MM:SS).
pub(crate) fn format_time(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;

    if hours >= 24 {
        let days = hours / 24;
        let remaining_hours = hours % 24;
        format!("{}-{:02}:{:02}:00", days, remaining_hours, mins)
    } else {
        format!("{:02}:{:02}:00", hours, mins)
    }
}
