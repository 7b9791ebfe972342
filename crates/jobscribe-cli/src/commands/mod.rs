//! CLI command implementations.

pub mod common;
pub mod render;
pub mod sbatch;
pub mod version;
pub mod write;
