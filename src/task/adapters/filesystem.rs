//! Filesystem document store confined to a single root directory.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::sync::Arc;

use crate::task::ports::{DocumentStore, DocumentStoreError, DocumentStoreResult};

/// Document store writing flat files beneath a capability-scoped directory.
///
/// File names must be a single path component; the directory handle refuses
/// anything that would resolve outside the root.
#[derive(Debug, Clone)]
pub struct DirectoryDocumentStore {
    root: Arc<Dir>,
}

impl DirectoryDocumentStore {
    /// Opens (creating if needed) the document root at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Io`] when the directory cannot be
    /// created or opened.
    pub fn open(path: &Utf8Path) -> DocumentStoreResult<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority()).map_err(DocumentStoreError::io)?;
        let root =
            Dir::open_ambient_dir(path, ambient_authority()).map_err(DocumentStoreError::io)?;
        Ok(Self {
            root: Arc::new(root),
        })
    }
}

fn validate_file_name(file_name: &str) -> DocumentStoreResult<()> {
    let is_single_component = !file_name.is_empty()
        && !file_name.contains(['/', '\\'])
        && file_name != "."
        && file_name != "..";
    if is_single_component {
        Ok(())
    } else {
        Err(DocumentStoreError::InvalidFileName(file_name.to_owned()))
    }
}

#[async_trait]
impl DocumentStore for DirectoryDocumentStore {
    async fn write(&self, file_name: &str, contents: &str) -> DocumentStoreResult<Utf8PathBuf> {
        validate_file_name(file_name)?;
        let root = Arc::clone(&self.root);
        let name = file_name.to_owned();
        let body = contents.to_owned();
        tokio::task::spawn_blocking(move || {
            root.write(&name, body.as_bytes())
                .map_err(DocumentStoreError::io)?;
            Ok(Utf8PathBuf::from(name))
        })
        .await
        .map_err(DocumentStoreError::io)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("report.txt", true)]
    #[case("", false)]
    #[case("..", false)]
    #[case("nested/report.txt", false)]
    #[case("..\\escape.txt", false)]
    fn file_names_must_be_single_components(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(validate_file_name(name).is_ok(), valid);
    }

    #[tokio::test]
    async fn write_persists_contents_under_root() {
        let temp = tempfile::tempdir().expect("temporary directory");
        let root = Utf8PathBuf::from_path_buf(temp.path().join("documents"))
            .expect("utf-8 temporary path");
        let store = DirectoryDocumentStore::open(&root).expect("open document root");

        let path = store
            .write("failure.txt", "stage failed\n")
            .await
            .expect("write document");

        assert_eq!(path, Utf8PathBuf::from("failure.txt"));
        let written = std::fs::read_to_string(root.join(&path)).expect("read back document");
        assert_eq!(written, "stage failed\n");
    }
}
