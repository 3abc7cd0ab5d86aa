//! Port for the externally supplied key/value blob store.
//!
//! The store holds string blobs under a fixed set of keys. Collection
//! repositories layer JSON encoding on top; the store itself knows nothing
//! about the shape of what it holds.

use std::fmt;

use async_trait::async_trait;

use super::define_port_error;

/// Keys of the persisted entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreKey {
    /// Global roster of users across all families.
    UsersList,
    /// The active session's cached profile.
    CurrentUser,
    /// Date string of the last daily reset.
    LastResetDate,
    /// All families.
    Families,
    /// All meals, mixed across families.
    Meals,
}

impl StoreKey {
    /// Every key, in a fixed order.
    pub const ALL: [Self; 5] = [
        Self::UsersList,
        Self::CurrentUser,
        Self::LastResetDate,
        Self::Families,
        Self::Meals,
    ];

    /// Name of the entry in the store.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UsersList => "users_list",
            Self::CurrentUser => "current_user",
            Self::LastResetDate => "last_reset_date",
            Self::Families => "families",
            Self::Meals => "meals",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

define_port_error! {
    /// Errors raised by blob store adapters.
    pub enum BlobStoreError {
        /// Reading an entry failed.
        Read { key: String, message: String } => "failed to read {key}: {message}",
        /// Writing or removing an entry failed.
        Write { key: String, message: String } => "failed to write {key}: {message}",
    }
}

/// String-keyed blob storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the blob stored under `key`, or `None` if nothing is stored.
    async fn get(&self, key: StoreKey) -> Result<Option<String>, BlobStoreError>;

    /// Store `value` under `key`, replacing any previous blob.
    async fn put(&self, key: StoreKey, value: &str) -> Result<(), BlobStoreError>;

    /// Remove the blob under `key`. Removing a missing key succeeds.
    async fn remove(&self, key: StoreKey) -> Result<(), BlobStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StoreKey::UsersList, "users_list")]
    #[case(StoreKey::CurrentUser, "current_user")]
    #[case(StoreKey::LastResetDate, "last_reset_date")]
    #[case(StoreKey::Families, "families")]
    #[case(StoreKey::Meals, "meals")]
    fn keys_use_persisted_entry_names(#[case] key: StoreKey, #[case] expected: &str) {
        assert_eq!(key.as_str(), expected);
        assert_eq!(key.to_string(), expected);
    }

    #[rstest]
    fn error_messages_name_the_key() {
        let err = BlobStoreError::write("meals", "disk full");
        assert_eq!(err.to_string(), "failed to write meals: disk full");
    }
}
