//! JSON-encoded collections over a blob store.
//!
//! Each collection is one blob: a JSON array for rosters, families and
//! meals, a JSON object for the session user, and a bare date string for
//! the reset marker. Arrays are decoded record by record: a record that
//! fails to decode is logged and skipped while the rest of the collection
//! loads. A blob that is not an array at all is logged and read as empty so
//! a corrupt entry heals on the next write instead of wedging start-up.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::domain::ports::{
    BlobStore, BlobStoreError, CollectionError, FamilyRepository, MealRepository,
    ResetMarkerRepository, SessionUserRepository, StoreKey, UsersRepository,
};
use crate::domain::{Family, Meal, ResetMarker, User};

/// Every collection repository, backed by one blob store.
#[derive(Debug, Default)]
pub struct JsonCollections<S> {
    store: S,
}

impl<S> JsonCollections<S> {
    /// Layer the collections over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying blob store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

fn map_store_error(error: BlobStoreError) -> CollectionError {
    match error {
        BlobStoreError::Read { key, message } => {
            CollectionError::unavailable(format!("{key}: {message}"))
        }
        BlobStoreError::Write { key, message } => {
            CollectionError::write(format!("{key}: {message}"))
        }
    }
}

impl<S: BlobStore> JsonCollections<S> {
    async fn read<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>, CollectionError> {
        let Some(raw) = self.store.get(key).await.map_err(map_store_error)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(error) => {
                warn!(%key, %error, "discarding unreadable collection");
                Ok(None)
            }
        }
    }

    async fn write<T: Serialize + ?Sized>(
        &self,
        key: StoreKey,
        value: &T,
    ) -> Result<(), CollectionError> {
        let encoded = serde_json::to_string(value)
            .map_err(|err| CollectionError::serialization(format!("{key}: {err}")))?;
        self.store.put(key, &encoded).await.map_err(map_store_error)
    }

    async fn read_all<T: DeserializeOwned>(
        &self,
        key: StoreKey,
    ) -> Result<Vec<T>, CollectionError> {
        let records: Vec<Value> = self.read(key).await?.unwrap_or_default();
        Ok(records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(item) => Some(item),
                Err(error) => {
                    warn!(%key, index, %error, "skipping unreadable record");
                    None
                }
            })
            .collect())
    }
}

#[async_trait]
impl<S: BlobStore> UsersRepository for JsonCollections<S> {
    async fn load_all(&self) -> Result<Vec<User>, CollectionError> {
        self.read_all(StoreKey::UsersList).await
    }

    async fn replace_all(&self, users: &[User]) -> Result<(), CollectionError> {
        self.write(StoreKey::UsersList, users).await
    }
}

#[async_trait]
impl<S: BlobStore> SessionUserRepository for JsonCollections<S> {
    async fn load(&self) -> Result<Option<User>, CollectionError> {
        self.read(StoreKey::CurrentUser).await
    }

    async fn save(&self, user: &User) -> Result<(), CollectionError> {
        self.write(StoreKey::CurrentUser, user).await
    }

    async fn clear(&self) -> Result<(), CollectionError> {
        self.store
            .remove(StoreKey::CurrentUser)
            .await
            .map_err(map_store_error)
    }
}

#[async_trait]
impl<S: BlobStore> FamilyRepository for JsonCollections<S> {
    async fn load_all(&self) -> Result<Vec<Family>, CollectionError> {
        self.read_all(StoreKey::Families).await
    }

    async fn replace_all(&self, families: &[Family]) -> Result<(), CollectionError> {
        self.write(StoreKey::Families, families).await
    }
}

#[async_trait]
impl<S: BlobStore> MealRepository for JsonCollections<S> {
    async fn load_all(&self) -> Result<Vec<Meal>, CollectionError> {
        self.read_all(StoreKey::Meals).await
    }

    async fn replace_all(&self, meals: &[Meal]) -> Result<(), CollectionError> {
        self.write(StoreKey::Meals, meals).await
    }
}

// The marker is stored as the bare date string, not JSON.
#[async_trait]
impl<S: BlobStore> ResetMarkerRepository for JsonCollections<S> {
    async fn load(&self) -> Result<Option<ResetMarker>, CollectionError> {
        let raw = self
            .store
            .get(StoreKey::LastResetDate)
            .await
            .map_err(map_store_error)?;
        Ok(raw
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .map(ResetMarker::from_stored))
    }

    async fn save(&self, marker: &ResetMarker) -> Result<(), CollectionError> {
        self.store
            .put(StoreKey::LastResetDate, marker.as_ref())
            .await
            .map_err(map_store_error)
    }
}
