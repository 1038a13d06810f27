//! In-memory user storage

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::domain::{DomainError, DomainResult, User, UserPayload, UserRepositoryInterface};

/// In-memory user store for development and testing.
///
/// Mirrors the database semantics: soft deletes, zero-value patch fields
/// are skipped, and missing ids are silently ignored on update/delete.
pub struct InMemoryUserRepository {
    users: DashMap<u32, User>,
    id_counter: AtomicU32,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            id_counter: AtomicU32::new(1),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn find_all(&self) -> DomainResult<Vec<User>> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|entry| entry.deleted_at.is_none())
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<User> {
        self.users
            .get(&id)
            .filter(|u| u.deleted_at.is_none())
            .map(|u| u.value().clone())
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    async fn create(&self, payload: UserPayload) -> DomainResult<User> {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let user = User {
            id,
            name: payload.name,
            email: payload.email,
            number: payload.number,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_by_id(&self, id: u32, patch: UserPayload) -> DomainResult<()> {
        if let Some(mut user) = self.users.get_mut(&id) {
            if user.deleted_at.is_some() {
                return Ok(());
            }
            if !patch.name.is_empty() {
                user.name = patch.name;
            }
            if !patch.email.is_empty() {
                user.email = patch.email;
            }
            if patch.number != 0 {
                user.number = patch.number;
            }
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: u32) -> DomainResult<()> {
        if let Some(mut user) = self.users.get_mut(&id) {
            if user.deleted_at.is_none() {
                user.deleted_at = Some(Utc::now());
            }
        }
        Ok(())
    }
}
