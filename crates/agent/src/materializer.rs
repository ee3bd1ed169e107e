//! Writes a structured reply's files into the workspace.
//!
//! Two phases. Every path is confined to the workspace first; one bad path
//! rejects the whole batch before anything touches the disk. Then files are
//! written in the order given, creating parent directories as needed and
//! overwriting what is there.

use crate::output::AgentOutput;
use std::path::{Path, PathBuf};
use tfpilot_core::error::{ArtifactError, Error, Result};
use tfpilot_security::{PathValidationError, confine};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Materialize `output` under `workspace_root`.
///
/// Returns the relative paths written, in input order. A write failure stops
/// the batch; files written before it stay on disk.
pub async fn materialize(
    output: &AgentOutput,
    workspace_root: &Path,
    cancel: &CancellationToken,
) -> Result<Vec<String>> {
    let root = absolute_root(workspace_root)?;

    // Phase 1: validate everything.
    let mut targets: Vec<(&str, PathBuf)> = Vec::with_capacity(output.files.len());
    for file in &output.files {
        let target = confine(&root, &file.path).map_err(|e| match e {
            PathValidationError::RootNotAbsolute => {
                Error::Internal("Workspace root is not absolute".into())
            }
            PathValidationError::OutsideRoot { .. } | PathValidationError::NotAFile { .. } => {
                warn!(path = %file.path, reason = %e, "Rejected generated file batch");
                Error::Artifact(ArtifactError::Confinement {
                    path: file.path.clone(),
                })
            }
        })?;
        targets.push((file.path.as_str(), target));
    }

    // Phase 2: write everything.
    let mut written = Vec::with_capacity(targets.len());
    for ((relative, target), file) in targets.into_iter().zip(&output.files) {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| write_error(relative, &e))?;
        }
        tokio::fs::write(&target, file.content.as_bytes())
            .await
            .map_err(|e| write_error(relative, &e))?;

        debug!(path = %relative, bytes = file.content.len(), "Wrote generated file");
        written.push(relative.to_string());
    }

    info!(files = written.len(), "Generated files written");
    Ok(written)
}

fn absolute_root(workspace_root: &Path) -> Result<PathBuf> {
    if workspace_root.is_absolute() {
        return Ok(workspace_root.to_path_buf());
    }
    std::path::absolute(workspace_root)
        .map_err(|e| Error::config(format!("Cannot resolve workspace directory: {e}")))
}

fn write_error(relative: &str, error: &std::io::Error) -> Error {
    Error::Artifact(ArtifactError::Write {
        path: relative.to_string(),
        reason: error.to_string(),
    })
}
