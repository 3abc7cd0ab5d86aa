//! Error mapping shared by the domain services.

use super::DomainError;
use super::ports::{CollectionError, IdentityProviderError};

/// Message shown when sign-in names an email nobody registered.
pub const UNKNOWN_ACCOUNT_MESSAGE: &str = "User not found. Try signing up!";

/// Map a collection failure to a domain error.
///
/// Connection failures are retryable from the caller's point of view;
/// anything else means a write did not land and is reported as internal.
pub(crate) fn map_collection_error(error: CollectionError) -> DomainError {
    match error {
        CollectionError::Unavailable { message } => DomainError::service_unavailable(message),
        CollectionError::Write { message } | CollectionError::Serialization { message } => {
            DomainError::internal(message)
        }
    }
}

/// Map an identity provider failure to a domain error.
pub(crate) fn map_identity_error(error: IdentityProviderError) -> DomainError {
    match error {
        IdentityProviderError::Rejected { message } => DomainError::unauthorized(message),
        IdentityProviderError::UnknownAccount { .. } => {
            DomainError::not_found(UNKNOWN_ACCOUNT_MESSAGE)
        }
        IdentityProviderError::Unavailable { message } => DomainError::service_unavailable(message),
    }
}
