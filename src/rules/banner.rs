use crate::edit::Edit;

/// Lint-suppression line prepended to the generated client.
pub const DEFAULT_BANNER: &str = "/* eslint-disable @typescript-eslint/no-empty-object-type */";

/// Prepends a fixed banner line unless the buffer already starts with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerRule {
    text: String,
}

impl Default for BannerRule {
    fn default() -> Self {
        Self::new(DEFAULT_BANNER)
    }
}

impl BannerRule {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when `source` begins with exactly this banner.
    pub fn is_present(&self, source: &str) -> bool {
        source.starts_with(&self.text)
    }

    /// Plan the insertion, or `None` if the banner is already there.
    pub fn plan(&self, source: &str) -> Option<Edit> {
        if self.is_present(source) {
            return None;
        }
        Some(Edit::insert(0, format!("{}\n", self.text)))
    }
}
