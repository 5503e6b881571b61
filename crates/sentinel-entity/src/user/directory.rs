//! User directory trait consumed by the auth subsystem.

use async_trait::async_trait;
use uuid::Uuid;

use sentinel_core::result::AppResult;

use super::model::{CreateUser, UpdateProfile, User};

/// Resolves user identities.
///
/// Lookups return `Ok(None)` for unknown users; `Err` is reserved for
/// backend failures.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Create a new active user. Fails with a `Conflict` error if the email is taken.
    async fn create(&self, user: CreateUser) -> AppResult<User>;

    /// Apply a profile update and return the updated user, or `None` if the user is gone.
    async fn update_profile(&self, id: Uuid, update: UpdateProfile) -> AppResult<Option<User>>;
}
