use crate::rules::{DEFAULT_BANNER, DEFAULT_KEY_TYPE};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Generated client patched when nothing else names a target.
pub const DEFAULT_TARGET: &str = "src/generated/api.ts";

/// A banner or key type containing this would be matched as a call site on
/// the next run.
const RECORD_CALL: &str = ".record(";

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PatcherConfig {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub banner: BannerConfig,
    #[serde(default)]
    pub record: RecordConfig,
}

impl PatcherConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.target.file.as_os_str().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "target.file",
            });
        }

        if self.banner.text.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "banner.text",
            });
        } else if self.banner.text.contains('\n') {
            issues.push(ValidationIssue::InvalidValue {
                field: "banner.text",
                message: "banner must be a single line".to_string(),
            });
        } else if self.banner.text.contains(RECORD_CALL) {
            issues.push(ValidationIssue::InvalidValue {
                field: "banner.text",
                message: format!("banner must not contain `{RECORD_CALL}`"),
            });
        }

        if self.record.key_type.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "record.key_type",
            });
        } else if self.record.key_type.contains(',') {
            issues.push(ValidationIssue::InvalidValue {
                field: "record.key_type",
                message: "key type must be a single expression without commas".to_string(),
            });
        } else if self.record.key_type.contains(RECORD_CALL) {
            issues.push(ValidationIssue::InvalidValue {
                field: "record.key_type",
                message: format!("key type must not contain `{RECORD_CALL}`"),
            });
        }

        if !self.banner.enabled && !self.record.enabled {
            issues.push(ValidationIssue::NothingEnabled);
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Target file, relative to `root` unless absolute
    #[serde(default = "default_target")]
    pub file: PathBuf,
    /// Workspace root; the current directory when unset
    #[serde(default)]
    pub root: Option<PathBuf>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            file: default_target(),
            root: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BannerConfig {
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default = "default_banner")]
    pub text: String,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            text: default_banner(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RecordConfig {
    #[serde(default = "enabled")]
    pub enabled: bool,
    /// Expression inserted as the first argument of single-argument record
    /// calls; surrounding whitespace is dropped
    #[serde(default = "default_key_type")]
    pub key_type: String,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key_type: default_key_type(),
        }
    }
}

fn default_target() -> PathBuf {
    PathBuf::from(DEFAULT_TARGET)
}

fn default_banner() -> String {
    DEFAULT_BANNER.to_string()
}

fn default_key_type() -> String {
    DEFAULT_KEY_TYPE.to_string()
}

fn enabled() -> bool {
    true
}

#[derive(Error, Debug, Clone)]
#[error("{}", render_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("invalid value for '{field}': {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    #[error("both banner and record rules are disabled")]
    NothingEnabled,
}
