//! Workspace scanning: the Terraform files a query is about.
//!
//! Best-effort: directory entries that cannot be walked and files that cannot
//! be read as UTF-8 are skipped without failing the query.
//!
//! Hidden directories below the root are not entered. That keeps `.terraform/`
//! (downloaded module sources) and `.git/` out of the context, which is never
//! trimmed.

use std::path::Path;
use tfpilot_core::error::{Error, Result};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use walkdir::WalkDir;

/// One file found in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceFile {
    /// Path relative to the workspace root, `/`-separated.
    pub relative_path: String,
    pub content: String,
}

/// The key conversation turns are stored under: the workspace path as given,
/// or the empty string when there is no workspace.
pub fn workspace_key(workspace_dir: Option<&Path>) -> String {
    workspace_dir
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Treat an empty path the same as no workspace at all.
pub fn non_empty(workspace_dir: Option<&Path>) -> Option<&Path> {
    workspace_dir.filter(|p| !p.as_os_str().is_empty())
}

/// Recursively collect files under `root` whose name ends with one of
/// `extensions`, sorted by relative path.
pub async fn scan_workspace(
    root: &Path,
    extensions: &[String],
    cancel: &CancellationToken,
) -> Result<Vec<WorkspaceFile>> {
    let root = root.to_path_buf();
    let extensions = extensions.to_vec();
    let cancel = cancel.clone();

    let files = tokio::task::spawn_blocking(move || scan_blocking(&root, &extensions, &cancel))
        .await
        .map_err(|e| Error::Internal(format!("Workspace scan task failed: {e}")))??;

    Ok(files)
}

fn scan_blocking(
    root: &Path,
    extensions: &[String],
    cancel: &CancellationToken,
) -> Result<Vec<WorkspaceFile>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden_dir(e));

    for entry in walker {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(error = %e, "Skipping unwalkable workspace entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
            continue;
        }

        let path = entry.path();
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };

        match std::fs::read_to_string(path) {
            Ok(content) => files.push(WorkspaceFile {
                relative_path: relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/"),
                content,
            }),
            Err(e) => debug!(path = %relative.display(), error = %e, "Skipping unreadable workspace file"),
        }
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(files)
}

fn is_hidden_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}
