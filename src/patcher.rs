//! The patch pipeline: existence check, read, rules, conditional write.

use crate::config::PatcherConfig;
use crate::edit::{apply_edits, atomic_write, EditError};
use crate::rules::{BannerRule, RecordCall, RecordKeyRule};
use crate::safety::{LocatedTarget, SafetyError, WorkspaceGuard};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("missing: {}", .0.display())]
    MissingTarget(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: EditError },

    #[error("edit error: {0}")]
    Edit(#[from] EditError),

    #[error(transparent)]
    Safety(#[from] SafetyError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Overwrite the target when the rules change it
    #[default]
    Write,
    /// Compute the result but leave the target untouched
    DryRun,
}

/// Result of running the rules over a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub contents: String,
    pub banner_inserted: bool,
    /// Normalized call sites; offsets and lines refer to the buffer after
    /// banner insertion
    pub normalized: Vec<RecordCall>,
}

impl Transformed {
    pub fn is_noop(&self) -> bool {
        !self.banner_inserted && self.normalized.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub file: PathBuf,
    pub original: String,
    pub patched: String,
    pub banner_inserted: bool,
    pub normalized: Vec<RecordCall>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchOutcome should be reported"]
pub enum PatchOutcome {
    /// The target was rewritten
    Patched(PatchReport),
    /// Dry run: the target would be rewritten
    WouldPatch(PatchReport),
    /// The target already has every patch
    Unchanged { file: PathBuf },
}

impl PatchOutcome {
    pub fn file(&self) -> &Path {
        match self {
            PatchOutcome::Patched(report) | PatchOutcome::WouldPatch(report) => &report.file,
            PatchOutcome::Unchanged { file } => file,
        }
    }

    pub fn report(&self) -> Option<&PatchReport> {
        match self {
            PatchOutcome::Patched(report) | PatchOutcome::WouldPatch(report) => Some(report),
            PatchOutcome::Unchanged { .. } => None,
        }
    }
}

impl fmt::Display for PatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchOutcome::Patched(report) => write!(f, "patched: {}", report.file.display()),
            PatchOutcome::WouldPatch(report) => {
                write!(f, "would patch: {}", report.file.display())
            }
            PatchOutcome::Unchanged { file } => write!(f, "no changes: {}", file.display()),
        }
    }
}

/// Runs the banner rule, then the record rule, over a generated client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patcher {
    banner: Option<BannerRule>,
    record: Option<RecordKeyRule>,
}

impl Default for Patcher {
    fn default() -> Self {
        Self::new(Some(BannerRule::default()), Some(RecordKeyRule::default()))
    }
}

impl Patcher {
    pub fn new(banner: Option<BannerRule>, record: Option<RecordKeyRule>) -> Self {
        Self { banner, record }
    }

    pub fn from_config(config: &PatcherConfig) -> Self {
        let banner = config
            .banner
            .enabled
            .then(|| BannerRule::new(config.banner.text.clone()));
        let record = config
            .record
            .enabled
            .then(|| RecordKeyRule::new(config.record.key_type.clone()));
        Self::new(banner, record)
    }

    /// Apply the rules to `source` without touching the filesystem.
    pub fn transform(&self, source: &str) -> Result<Transformed, EditError> {
        let mut contents = source.to_string();
        let mut banner_inserted = false;
        let mut normalized = Vec::new();

        if let Some(banner) = &self.banner {
            match banner.plan(&contents) {
                Some(edit) => {
                    debug!("inserting banner");
                    contents = apply_edits(&contents, vec![edit])?;
                    banner_inserted = true;
                }
                None => debug!("banner already present"),
            }
        }

        if let Some(record) = &self.record {
            // Record calls spelled inside the banner line are not client code
            let banner_end = self
                .banner
                .as_ref()
                .filter(|banner| banner.is_present(&contents))
                .map_or(0, |banner| banner.text().len());

            let planned: Vec<_> = record
                .plan(&contents)
                .into_iter()
                .filter(|(call, _)| call.args_start > banner_end)
                .collect();
            if !planned.is_empty() {
                let (calls, edits): (Vec<_>, Vec<_>) = planned.into_iter().unzip();
                for call in &calls {
                    debug!(line = call.line, form = ?call.form, "normalizing record call");
                }
                contents = apply_edits(&contents, edits)?;
                normalized = calls;
            }
        }

        Ok(Transformed {
            contents,
            banner_inserted,
            normalized,
        })
    }

    /// Patch `target` in place.
    ///
    /// A missing target fails with [`PatchError::MissingTarget`] before any
    /// read. The file is only written when the rules changed it.
    pub fn run(&self, target: &Path, mode: RunMode) -> Result<PatchOutcome, PatchError> {
        if !target.exists() {
            return Err(PatchError::MissingTarget(target.to_path_buf()));
        }

        let canonical = target.canonicalize().map_err(|source| PatchError::Read {
            path: target.to_path_buf(),
            source,
        })?;
        let located = LocatedTarget {
            given: target.to_path_buf(),
            canonical,
        };
        self.patch_located(&located, None, mode)
    }

    /// Like [`Patcher::run`], but only for targets the guard accepts.
    ///
    /// Reads and writes go to the canonical file, so a symlinked target
    /// stays a symlink. Outcomes and errors name `target` as given. The
    /// guard re-checks the target right before the write.
    pub fn run_guarded(
        &self,
        guard: &WorkspaceGuard,
        target: &Path,
        mode: RunMode,
    ) -> Result<PatchOutcome, PatchError> {
        let located = guard
            .locate(target)?
            .ok_or_else(|| PatchError::MissingTarget(target.to_path_buf()))?;
        debug!(
            given = %located.given.display(),
            canonical = %located.canonical.display(),
            "located target"
        );
        self.patch_located(&located, Some(guard), mode)
    }

    fn patch_located(
        &self,
        located: &LocatedTarget,
        guard: Option<&WorkspaceGuard>,
        mode: RunMode,
    ) -> Result<PatchOutcome, PatchError> {
        let original =
            fs::read_to_string(&located.canonical).map_err(|source| PatchError::Read {
                path: located.given.clone(),
                source,
            })?;

        let transformed = self.transform(&original)?;

        if transformed.contents == original {
            debug!(file = %located.given.display(), "no changes");
            return Ok(PatchOutcome::Unchanged {
                file: located.given.clone(),
            });
        }

        let report = PatchReport {
            file: located.given.clone(),
            original,
            patched: transformed.contents,
            banner_inserted: transformed.banner_inserted,
            normalized: transformed.normalized,
        };

        if mode == RunMode::DryRun {
            return Ok(PatchOutcome::WouldPatch(report));
        }

        if let Some(guard) = guard {
            guard.revalidate(located)?;
        }
        atomic_write(&located.canonical, report.patched.as_bytes()).map_err(|source| {
            PatchError::Write {
                path: located.given.clone(),
                source,
            }
        })?;
        info!(
            file = %located.given.display(),
            banner = report.banner_inserted,
            record_calls = report.normalized.len(),
            "patched"
        );
        Ok(PatchOutcome::Patched(report))
    }
}
