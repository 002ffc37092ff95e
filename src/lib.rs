//! Zod Client Patcher: post-generation fixes for generated TypeScript clients
//!
//! Code generators emit zod schemas that lag behind the library: record types
//! come out as `z.record(Value)` where current zod wants
//! `z.record(Key, Value)`, and the output trips the
//! `@typescript-eslint/no-empty-object-type` lint. This crate patches the
//! generated file after each regeneration:
//!
//! - prepends a lint-suppression banner ([`rules::BannerRule`])
//! - inserts `z.string()` as the key of single-argument record calls
//!   ([`rules::RecordKeyRule`])
//!
//! # Architecture
//!
//! Rules plan [`Edit`]s against a text buffer; [`Patcher`] runs them in order
//! and writes the file back only if something changed. Matching is textual;
//! the TypeScript grammar is never parsed.
//!
//! # Safety
//!
//! - Every edit verifies its expected before-text
//! - Atomic file writes (tempfile + fsync + rename) to the resolved file,
//!   so a symlinked target stays a symlink
//! - Workspace boundary enforcement, re-checked right before the write
//! - Idempotent rules: a second run is always a no-op, for any config that
//!   passes validation
//!
//! # Example
//!
//! ```
//! use zod_client_patcher::Patcher;
//!
//! let out = Patcher::default().transform("const M = z.record(z.number());").unwrap();
//! assert!(out.contents.ends_with("z.record(z.string(), z.number());"));
//! ```

pub mod config;
pub mod edit;
pub mod logging;
pub mod patcher;
pub mod rules;
pub mod safety;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, PatcherConfig};
pub use edit::{apply_edits, Edit, EditError};
pub use patcher::{PatchError, PatchOutcome, PatchReport, Patcher, RunMode, Transformed};
pub use rules::{call_site_already_has_string_key, BannerRule, RecordCall, RecordKeyRule};
pub use safety::{LocatedTarget, SafetyError, WorkspaceGuard};
