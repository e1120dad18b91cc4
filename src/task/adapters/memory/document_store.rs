//! In-memory document store for tests.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::ports::{DocumentStore, DocumentStoreError, DocumentStoreResult};

/// Thread-safe in-memory document store keyed by relative path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    files: Arc<RwLock<HashMap<Utf8PathBuf, String>>>,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the contents written at `path`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Io`] when lock acquisition fails.
    pub fn contents(&self, path: &Utf8Path) -> DocumentStoreResult<Option<String>> {
        let files = self
            .files
            .read()
            .map_err(|err| DocumentStoreError::io(std::io::Error::other(err.to_string())))?;
        Ok(files.get(path).cloned())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn write(&self, file_name: &str, contents: &str) -> DocumentStoreResult<Utf8PathBuf> {
        let path = Utf8PathBuf::from(file_name);
        let mut files = self
            .files
            .write()
            .map_err(|err| DocumentStoreError::io(std::io::Error::other(err.to_string())))?;
        files.insert(path.clone(), contents.to_owned());
        Ok(path)
    }
}
