//! Reading `zod-client-patcher.toml`.

use crate::config::schema::{PatcherConfig, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file picked up from the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "zod-client-patcher.toml";

/// Where the config text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    Inline,
    File(PathBuf),
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::Inline => f.write_str("<inline>"),
            ConfigOrigin::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config {origin} is not valid TOML")]
    Parse {
        origin: ConfigOrigin,
        source: toml_edit::de::Error,
    },

    #[error("config {origin} rejected")]
    Invalid {
        origin: ConfigOrigin,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn origin(&self) -> ConfigOrigin {
        match self {
            ConfigError::Read { path, .. } => ConfigOrigin::File(path.clone()),
            ConfigError::Parse { origin, .. } | ConfigError::Invalid { origin, .. } => {
                origin.clone()
            }
        }
    }
}

fn parse(input: &str, origin: ConfigOrigin) -> Result<PatcherConfig, ConfigError> {
    let config: PatcherConfig = match toml_edit::de::from_str(input) {
        Ok(config) => config,
        Err(source) => return Err(ConfigError::Parse { origin, source }),
    };
    match config.validate() {
        Ok(()) => Ok(config),
        Err(source) => Err(ConfigError::Invalid { origin, source }),
    }
}

pub fn load_from_str(input: &str) -> Result<PatcherConfig, ConfigError> {
    parse(input, ConfigOrigin::Inline)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<PatcherConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, ConfigOrigin::File(path.to_path_buf()))
}

/// Look for [`CONFIG_FILE_NAME`] directly inside `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

/// Load the explicit config if given, else a discovered one, else defaults.
pub fn load_or_default(
    explicit: Option<&Path>,
    search_dir: &Path,
) -> Result<(PatcherConfig, Option<PathBuf>), ConfigError> {
    let Some(path) = explicit.map(Path::to_path_buf).or_else(|| discover(search_dir)) else {
        return Ok((PatcherConfig::default(), None));
    };
    let config = load_from_path(&path)?;
    Ok((config, Some(path)))
}
