//! Ports for the global user roster and the cached session user.
//!
//! Both collections are shared and multi-writer with no locking: a
//! `replace_all` overwrites whatever another session wrote in between
//! (last write wins at the granularity of the whole collection).

use async_trait::async_trait;

use crate::domain::User;

use super::CollectionError;

/// Global roster across all families (`users_list`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Fetch every user record. A missing or unreadable roster is empty.
    async fn load_all(&self) -> Result<Vec<User>, CollectionError>;

    /// Replace the roster with `users`.
    async fn replace_all(&self, users: &[User]) -> Result<(), CollectionError>;
}

/// The single cached profile of the active session (`current_user`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionUserRepository: Send + Sync {
    /// Fetch the cached session user, if any.
    async fn load(&self) -> Result<Option<User>, CollectionError>;

    /// Persist `user` as the cached session user.
    async fn save(&self, user: &User) -> Result<(), CollectionError>;

    /// Discard the cached session user.
    async fn clear(&self) -> Result<(), CollectionError>;
}
