//! Storage traits for persistence

use crate::{NewUser, Result, User, UserChanges, UserId};
use async_trait::async_trait;

/// User store
///
/// Every operation acts on the single `users` table. Lookups report a miss as
/// `Ok(None)`; `update` and `delete` report it as [`crate::UsersError::NotFound`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// All users in insertion order.
    async fn get_all(&self) -> Result<Vec<User>>;

    /// Insert a user; the store assigns the id.
    async fn create(&self, new_user: NewUser) -> Result<User>;

    /// Merge `changes` into the stored record and return the record as persisted.
    async fn update(&self, id: UserId, changes: UserChanges) -> Result<User>;

    /// Hard delete; returns the record as it was just before removal.
    async fn delete(&self, id: UserId) -> Result<User>;
}
