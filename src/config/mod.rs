pub mod loader;
pub mod schema;

pub use loader::{
    discover, load_from_path, load_from_str, load_or_default, ConfigError, ConfigOrigin,
    CONFIG_FILE_NAME,
};
pub use schema::{
    BannerConfig, PatcherConfig, RecordConfig, TargetConfig, ValidationError, ValidationIssue,
    DEFAULT_TARGET,
};
