//! Storage trait definition and error types.

use thiserror::Error;

use crate::Page;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("Invalid page title: {0:?}")]
    InvalidTitle(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Abstract storage backend for page access.
///
/// Implementations persist sanitized page bodies keyed by title. Titles
/// are validated against the identifier pattern before any filesystem
/// access, so a backend never sees a key it cannot store safely.
#[async_trait::async_trait]
pub trait PageStore: Send + Sync {
    /// Read the persisted content for `title`.
    ///
    /// Fails with [`StoreError::NotFound`] if no record exists.
    async fn load(&self, title: &str) -> Result<Page>;

    /// Sanitize `body` and durably persist it under `title`, overwriting
    /// any prior content.
    ///
    /// A failed save never leaves a partially written record observable
    /// by a concurrent load.
    async fn save(&self, title: &str, body: &str) -> Result<()>;

    /// Titles of all persisted pages, in no particular order.
    async fn list(&self) -> Result<Vec<String>>;
}
