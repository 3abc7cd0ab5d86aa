//! Port for the meal collection (`meals`).
//!
//! Meals of every family live in one collection; readers filter by family.

use async_trait::async_trait;

use crate::domain::Meal;

use super::CollectionError;

/// Get-all/replace-all access to every meal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MealRepository: Send + Sync {
    /// Fetch every meal. A missing or unreadable collection is empty.
    async fn load_all(&self) -> Result<Vec<Meal>, CollectionError>;

    /// Replace the collection with `meals`.
    async fn replace_all(&self, meals: &[Meal]) -> Result<(), CollectionError>;
}
