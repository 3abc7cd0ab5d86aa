//! File-backed blob store: one `<key>.json` file per entry.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use thiserror::Error;
use tracing::debug;

use super::atomic_io::replace_file;
use crate::domain::ports::{BlobStore, BlobStoreError, StoreKey};

/// Errors raised while opening the data directory.
#[derive(Debug, Error)]
pub enum FileStoreError {
    /// The directory could not be created or opened.
    #[error("failed to open data directory {path}: {source}")]
    Open {
        /// Directory that failed to open.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
}

/// Blob store keeping each entry in its own file inside one directory.
///
/// All access goes through a capability handle, so entries cannot escape
/// the directory. Writes replace files atomically.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: Arc<Dir>,
    root: Utf8PathBuf,
}

impl FileBlobStore {
    /// Open `root`, creating it and any missing parents.
    pub fn open(root: &Utf8Path) -> Result<Self, FileStoreError> {
        let open_error = |source| FileStoreError::Open {
            path: root.to_path_buf(),
            source,
        };
        Dir::create_ambient_dir_all(root, ambient_authority()).map_err(open_error)?;
        let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(open_error)?;
        debug!(%root, "opened file blob store");
        Ok(Self {
            dir: Arc::new(dir),
            root: root.to_path_buf(),
        })
    }

    /// Directory holding the entries.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn file_name(key: StoreKey) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{}.json", key.as_str()))
    }

    async fn blocking<T, F>(&self, key: StoreKey, op: F) -> io::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Dir, &Utf8Path) -> io::Result<T> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        tokio::task::spawn_blocking(move || op(&dir, &Self::file_name(key)))
            .await
            .map_err(io::Error::other)?
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, BlobStoreError> {
        self.blocking(key, |dir, name| match dir.read_to_string(name) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        })
        .await
        .map_err(|err| BlobStoreError::read(key.as_str(), err.to_string()))
    }

    async fn put(&self, key: StoreKey, value: &str) -> Result<(), BlobStoreError> {
        let contents = value.to_owned();
        self.blocking(key, move |dir, name| replace_file(dir, name, &contents))
            .await
            .map_err(|err| BlobStoreError::write(key.as_str(), err.to_string()))
    }

    async fn remove(&self, key: StoreKey) -> Result<(), BlobStoreError> {
        self.blocking(key, |dir, name| match dir.remove_file(name) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        })
        .await
        .map_err(|err| BlobStoreError::write(key.as_str(), err.to_string()))
    }
}
