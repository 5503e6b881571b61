//! In-process user directory backed by `dashmap`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use sentinel_core::error::AppError;
use sentinel_core::result::AppResult;
use sentinel_entity::user::model::normalize_email;
use sentinel_entity::user::{CreateUser, UpdateProfile, User, UserDirectory};

/// Concurrent in-memory user directory.
///
/// Email uniqueness is enforced through the email index entry lock, so
/// concurrent registrations of one address yield exactly one user.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserDirectory {
    users: Arc<DashMap<Uuid, User>>,
    by_email: Arc<DashMap<String, Uuid>>,
}

impl MemoryUserDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the active flag of a user. Returns `false` if the user does not exist.
    pub fn set_active(&self, id: Uuid, active: bool) -> bool {
        match self.users.get_mut(&id) {
            Some(mut user) => {
                user.is_active = active;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Remove a user entirely. Returns the removed record.
    pub fn remove(&self, id: Uuid) -> Option<User> {
        let (_, user) = self.users.remove(&id)?;
        self.by_email.remove(&user.email);
        Some(user)
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let Some(id) = self.by_email.get(&normalize_email(email)).map(|id| *id) else {
            return Ok(None);
        };
        self.find_by_id(id).await
    }

    async fn create(&self, user: CreateUser) -> AppResult<User> {
        let email = normalize_email(&user.email);
        match self.by_email.entry(email.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict("Email already registered")),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let record = User {
                    id: Uuid::new_v4(),
                    email,
                    password_hash: user.password_hash,
                    first_name: user.first_name,
                    last_name: user.last_name,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                };
                self.users.insert(record.id, record.clone());
                slot.insert(record.id);
                Ok(record)
            }
        }
    }

    async fn update_profile(&self, id: Uuid, update: UpdateProfile) -> AppResult<Option<User>> {
        let Some(mut user) = self.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(first_name) = update.first_name {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = update.last_name {
            user.last_name = Some(last_name);
        }
        user.updated_at = Utc::now();
        Ok(Some(user.value().clone()))
    }
}
