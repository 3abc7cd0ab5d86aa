//! Port for the daily reset marker (`last_reset_date`).

use async_trait::async_trait;

use crate::domain::ResetMarker;

use super::CollectionError;

/// Storage for the date of the last daily status reset.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResetMarkerRepository: Send + Sync {
    /// Fetch the marker written by the last reset, if any.
    async fn load(&self) -> Result<Option<ResetMarker>, CollectionError>;

    /// Record that a reset ran on `marker`'s day.
    async fn save(&self, marker: &ResetMarker) -> Result<(), CollectionError>;
}
