//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the key/value store, the collections layered on it, the identity
//! provider). Each trait exposes strongly typed errors so adapters map
//! their failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod blob_store;
mod collection_error;
mod family_repository;
mod identity_provider;
mod meal_repository;
mod reset_marker_repository;
mod user_repository;

#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use blob_store::{BlobStore, BlobStoreError, StoreKey};
pub use collection_error::CollectionError;
#[cfg(test)]
pub use family_repository::MockFamilyRepository;
pub use family_repository::FamilyRepository;
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{IdentityProvider, IdentityProviderError, SignUpOutcome};
#[cfg(test)]
pub use meal_repository::MockMealRepository;
pub use meal_repository::MealRepository;
#[cfg(test)]
pub use reset_marker_repository::MockResetMarkerRepository;
pub use reset_marker_repository::ResetMarkerRepository;
#[cfg(test)]
pub use user_repository::{MockSessionUserRepository, MockUsersRepository};
pub use user_repository::{SessionUserRepository, UsersRepository};
