//! SLURM sbatch submit descriptions for single-task jobs.

mod submit;
mod templates;

pub use submit::SbatchSubmit;
