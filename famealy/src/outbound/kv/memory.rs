//! In-memory blob store for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{BlobStore, BlobStoreError, StoreKey};

/// Blob store held in a mutex-guarded map. Contents vanish on drop.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    entries: Mutex<HashMap<StoreKey, String>>,
}

impl InMemoryBlobStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `entries`.
    pub fn with_entries<I, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (StoreKey, V)>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }

    /// Raw blob under `key`, bypassing the async port.
    pub fn raw(&self, key: StoreKey) -> Option<String> {
        self.lock().get(&key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<StoreKey, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, BlobStoreError> {
        Ok(self.raw(key))
    }

    async fn put(&self, key: StoreKey, value: &str) -> Result<(), BlobStoreError> {
        self.lock().insert(key, value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: StoreKey) -> Result<(), BlobStoreError> {
        self.lock().remove(&key);
        Ok(())
    }
}
