//! Storage port for document contents.

use async_trait::async_trait;
use camino::Utf8PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Result type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

/// Writes document bodies somewhere readable by the web delivery layer.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Writes `contents` under `file_name` and returns the stored path,
    /// relative to the store root.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Io`] when the contents cannot be
    /// written.
    async fn write(&self, file_name: &str, contents: &str) -> DocumentStoreResult<Utf8PathBuf>;
}

/// Errors returned by document store implementations.
#[derive(Debug, Clone, Error)]
pub enum DocumentStoreError {
    /// The file name would escape the store root.
    #[error("invalid document file name: {0}")]
    InvalidFileName(String),

    /// Underlying I/O failure.
    #[error("document store I/O error: {0}")]
    Io(Arc<dyn std::error::Error + Send + Sync>),
}

impl DocumentStoreError {
    /// Wraps an I/O error.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Io(Arc::new(err))
    }
}
