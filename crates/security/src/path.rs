//! Path confinement: keep generated files inside their workspace.
//!
//! Paths supplied by the model are joined onto a workspace root and
//! normalized lexically. The result must stay under the root; anything that
//! climbs out with `..`, or replaces the root with an absolute path, is
//! rejected before a single byte is written.

use std::path::{Component, Path, PathBuf};

/// Error returned when path validation fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathValidationError {
    #[error("Path '{path}' resolves outside the workspace root")]
    OutsideRoot { path: String },

    #[error("Path '{path}' does not name a file inside the workspace")]
    NotAFile { path: String },

    #[error("Workspace root must be absolute")]
    RootNotAbsolute,
}

/// Lexically normalize a path: drop `.` components and resolve `..` against
/// the components before it. Never climbs above the filesystem root and never
/// touches the filesystem (symlinks are not resolved).
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                match out.components().next_back() {
                    Some(Component::Normal(_)) => {
                        out.pop();
                    }
                    // `..` at the root stays at the root
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => out.push(".."),
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Whether `target` equals `root` or lies beneath it.
///
/// Compares whole components, so `/tmp/foobar` is never inside `/tmp/foo`.
pub fn is_within(root: &Path, target: &Path) -> bool {
    target.starts_with(root)
}

/// Resolve `relative` under `root` and verify the result stays inside it.
///
/// Returns the normalized absolute target on success. A target equal to the
/// root itself is rejected: it cannot be written as a file.
///
/// The check is purely lexical and never touches the filesystem. Symlinks are
/// not resolved, so a link inside `root` that points elsewhere passes and a
/// write through it lands outside the workspace.
pub fn confine(root: &Path, relative: &str) -> Result<PathBuf, PathValidationError> {
    if !root.is_absolute() {
        return Err(PathValidationError::RootNotAbsolute);
    }

    let root = normalize(root);
    let target = normalize(&root.join(relative));

    if !is_within(&root, &target) {
        return Err(PathValidationError::OutsideRoot {
            path: relative.to_string(),
        });
    }

    if target == root {
        return Err(PathValidationError::NotAFile {
            path: relative.to_string(),
        });
    }

    Ok(target)
}
