//! Workspace boundary for the patch target.
//!
//! A generated client is only patched when its real location (symlinks
//! resolved) lies under the workspace root and outside package-manager and
//! VCS directories.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Directory names that are never patched, at any depth under the root.
const FORBIDDEN_DIRS: &[&str] = &["node_modules", ".git"];

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("Path is outside workspace: {path} (workspace: {workspace})")]
    OutsideWorkspace { path: PathBuf, workspace: PathBuf },

    #[error("Path is inside {dir}/: {path}")]
    ForbiddenPath { path: PathBuf, dir: &'static str },

    #[error("Failed to resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A target that passed the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedTarget {
    /// The path as the caller spelled it, for status lines
    pub given: PathBuf,
    /// Real file location; reads and writes go here
    pub canonical: PathBuf,
}

#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    root: PathBuf,
}

impl WorkspaceGuard {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let root = root.as_ref();
        let root = root.canonicalize().map_err(|source| SafetyError::Resolve {
            path: root.to_path_buf(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.root
    }

    /// Join a relative target onto the root; absolute targets pass through.
    pub fn resolve(&self, target: &Path) -> PathBuf {
        if target.is_absolute() {
            target.to_path_buf()
        } else {
            self.root.join(target)
        }
    }

    /// Find `target` under the root.
    ///
    /// `Ok(None)` means the target does not exist; that is reported before
    /// any boundary check so a missing file is always just "missing".
    pub fn locate(&self, target: &Path) -> Result<Option<LocatedTarget>, SafetyError> {
        let resolved = self.resolve(target);
        if !resolved.exists() {
            return Ok(None);
        }

        let canonical = self.check(&resolved)?;
        Ok(Some(LocatedTarget {
            given: target.to_path_buf(),
            canonical,
        }))
    }

    /// Re-check a located target right before writing to it, in case the
    /// path was swapped (e.g. for a symlink) since it was located.
    pub fn revalidate(&self, located: &LocatedTarget) -> Result<(), SafetyError> {
        let canonical = self.check(&located.canonical)?;
        if canonical != located.canonical {
            return Err(SafetyError::OutsideWorkspace {
                path: canonical,
                workspace: self.root.clone(),
            });
        }
        Ok(())
    }

    fn check(&self, path: &Path) -> Result<PathBuf, SafetyError> {
        let canonical = path.canonicalize().map_err(|source| SafetyError::Resolve {
            path: path.to_path_buf(),
            source,
        })?;

        let Ok(relative) = canonical.strip_prefix(&self.root) else {
            return Err(SafetyError::OutsideWorkspace {
                path: canonical,
                workspace: self.root.clone(),
            });
        };

        let forbidden = relative.components().find_map(|component| match component {
            Component::Normal(name) => FORBIDDEN_DIRS.iter().copied().find(|dir| *name == **dir),
            _ => None,
        });
        if let Some(dir) = forbidden {
            return Err(SafetyError::ForbiddenPath {
                path: canonical,
                dir,
            });
        }

        Ok(canonical)
    }
}
