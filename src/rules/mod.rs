//! Text rewrite rules applied to a generated client.
//!
//! Each rule plans a list of [`Edit`](crate::edit::Edit)s against the buffer
//! it is given and never touches the filesystem. Rules are idempotent: planning
//! on a buffer the rule already rewrote yields no edits.

pub mod banner;
pub mod record;

pub use banner::{BannerRule, DEFAULT_BANNER};
pub use record::{
    call_site_already_has_string_key, CallForm, RecordCall, RecordKeyRule, DEFAULT_KEY_TYPE,
};
