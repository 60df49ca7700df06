//! Page model and flat-file page storage
//!
//! A page is a titled unit of sanitized HTML text. Titles double as
//! storage keys, so they are restricted to `[a-zA-Z0-9]+` and validated
//! before anything touches the filesystem.

mod file;
mod traits;

pub use file::FileStore;
pub use traits::{PageStore, Result, StoreError};

use once_cell::sync::Lazy;
use regex::Regex;

static TITLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[a-zA-Z0-9]+$").expect("title pattern is valid"));

/// A titled unit of stored, sanitized text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub body: String,
}

impl Page {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// A page with no content yet, as handed to a first-time editor.
    pub fn empty(title: impl Into<String>) -> Self {
        Self::new(title, "")
    }
}

/// Check a title against the identifier pattern.
///
/// Anything outside `[a-zA-Z0-9]+` is rejected, which also keeps path
/// separators and traversal sequences away from the store.
pub fn validate_title(title: &str) -> Result<()> {
    if TITLE_PATTERN.is_match(title) {
        Ok(())
    } else {
        Err(StoreError::InvalidTitle(title.to_string()))
    }
}
