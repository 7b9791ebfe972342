//! Error handling for submit-description and workflow generation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for jobscribe operations.
pub type DagResult<T> = Result<T, DagError>;

/// Errors that can occur while building or writing job descriptions.
#[derive(Error, Debug)]
pub enum DagError {
    /// A dependency references a node that is not part of the workflow.
    #[error("Unknown DAGMan node: {0}")]
    UnknownNode(String),

    /// A SLURM description asks for a task count other than one.
    #[error("Unsupported job shape: expected ntasks=1, found ntasks={ntasks}")]
    UnsupportedJobShape { ntasks: String },

    /// A workflow manifest is structurally valid but semantically wrong.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// A path that must be written into a generated file is not UTF-8.
    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML deserialization error.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),
}
