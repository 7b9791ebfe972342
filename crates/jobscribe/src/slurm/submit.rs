//! sbatch submit description.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::error::{DagError, DagResult};
use crate::ordered::OrderedMap;
use crate::slurm::templates;

/// sbatch submit description of a single-task SLURM job.
///
/// The generated script runs `executable` inside a scratch directory named
/// after the job, copying `transfer_input_files` in beforehand and moving
/// `transfer_output_files` back afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SbatchSubmit {
    /// Output path of the batch script.
    pub filename: PathBuf,

    /// Path to the executable.
    pub executable: PathBuf,

    /// Arguments passed verbatim to `executable`.
    pub arguments: String,

    /// sbatch options, written as `#SBATCH --<key>=<value>`.
    pub options: OrderedMap<String, String>,

    /// Copy `executable` into the working directory before running it.
    pub transfer_executable: bool,

    /// Files copied into the working directory before execution.
    pub transfer_input_files: Vec<PathBuf>,

    /// Files moved out of the working directory after execution.
    pub transfer_output_files: Vec<PathBuf>,

    written_to_disk: bool,
}

impl SbatchSubmit {
    /// Create a description with `ntasks=1`.
    pub fn new(filename: impl Into<PathBuf>, executable: impl Into<PathBuf>) -> Self {
        let mut options = OrderedMap::new();
        options.insert("ntasks".to_string(), "1".to_string());

        Self {
            filename: filename.into(),
            executable: executable.into(),
            arguments: String::new(),
            options,
            transfer_executable: false,
            transfer_input_files: Vec::new(),
            transfer_output_files: Vec::new(),
            written_to_disk: false,
        }
    }

    /// Set the executable's arguments.
    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = arguments.into();
        self
    }

    /// Set an sbatch option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.options.insert(key.into(), value.to_string());
        self
    }

    /// Set `job-name`, replacing characters SLURM does not accept.
    pub fn with_job_name(self, name: &str) -> Self {
        self.with_option("job-name", templates::sanitize_name(name))
    }

    /// Set `time` from a limit in minutes.
    pub fn with_time_limit(self, minutes: u32) -> Self {
        self.with_option("time", templates::format_time(minutes))
    }

    /// Configured task count; `None` leaves it to the sbatch default of one.
    pub fn ntasks(&self) -> Option<&str> {
        self.options.get("ntasks").map(String::as_str)
    }

    /// Reject anything but a single task.
    pub fn validate(&self) -> DagResult<()> {
        match self.ntasks() {
            None => Ok(()),
            Some(value) if value.trim().parse::<u64>() == Ok(1) => Ok(()),
            Some(value) => Err(DagError::UnsupportedJobShape {
                ntasks: value.to_string(),
            }),
        }
    }

    /// Render the complete batch script with absolute file paths.
    pub fn render_script(&self) -> DagResult<String> {
        self.validate()?;
        templates::generate_batch_script(self)
    }

    /// Write the batch script to `filename`.
    ///
    /// The task count is checked first; a multi-task description fails with
    /// [`DagError::UnsupportedJobShape`] without touching the file system.
    pub fn dump(&mut self) -> DagResult<()> {
        let script = self.render_script()?;
        fs::write(&self.filename, script)?;
        self.written_to_disk = true;

        tracing::info!(path = %self.filename.display(), "wrote SLURM batch script");
        Ok(())
    }

    /// Whether the batch script was written to disk.
    pub fn written_to_disk(&self) -> bool {
        self.written_to_disk
    }
}

impl fmt::Display for SbatchSubmit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self
            .options
            .iter()
            .map(|(key, value)| format!("#SBATCH --{key}={value}"))
            .collect();
        f.write_str(&lines.join("\n"))
    }
}
