//! Port for the family collection (`families`).

use async_trait::async_trait;

use crate::domain::Family;

use super::CollectionError;

/// Get-all/replace-all access to every family.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FamilyRepository: Send + Sync {
    /// Fetch every family. A missing or unreadable collection is empty.
    async fn load_all(&self) -> Result<Vec<Family>, CollectionError>;

    /// Replace the collection with `families`.
    async fn replace_all(&self, families: &[Family]) -> Result<(), CollectionError>;
}
