use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::CredentialStore;
use crate::error::AppError;
use crate::models::{Identity, NewUser};

/// Process-local credential store keyed by username.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<String, Identity>>,
    next_id: AtomicI64,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an identity as-is.
    pub fn insert(&self, identity: Identity) {
        self.next_id.fetch_max(identity.id, Ordering::Relaxed);
        self.write().insert(identity.username.clone(), identity);
    }

    pub fn get(&self, username: &str) -> Option<Identity> {
        self.read().get(username).cloned()
    }

    /// Deletes an account, returning whether it existed.
    pub fn remove(&self, username: &str) -> bool {
        self.write().remove(username).is_some()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Identity>> {
        self.users.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Identity>> {
        self.users.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AppError> {
        Ok(self.get(username))
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError> {
        Ok(self.read().contains_key(username))
    }

    async fn create(&self, user: NewUser) -> Result<Identity, AppError> {
        let mut users = self.write();
        if users.contains_key(&user.username) {
            return Err(AppError::BadRequest("Username is taken".into()));
        }
        let identity = Identity {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
        };
        users.insert(identity.username.clone(), identity.clone());
        Ok(identity)
    }
}
