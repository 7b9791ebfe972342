//! Shared helpers for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};

use jobscribe::{DagJob, WorkflowManifest};

/// Load a workflow manifest and build its DAG.
pub fn load_dag(path: &str, base_dir: Option<&Path>) -> Result<DagJob> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        anyhow::bail!("File not found: {path}");
    }

    tracing::debug!(path, "loading workflow manifest");
    let manifest = WorkflowManifest::from_path(path_obj)
        .with_context(|| format!("Failed to load manifest: {path}"))?;

    manifest
        .into_dag(base_dir)
        .with_context(|| format!("Invalid workflow in {path}"))
}

/// Split a `KEY=VALUE` option.
pub fn parse_key_value(option: &str) -> Result<(String, String)> {
    match option.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => anyhow::bail!("Invalid option '{option}': expected KEY=VALUE"),
    }
}
