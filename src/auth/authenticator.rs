use actix_web::web;
use bcrypt::DEFAULT_COST;
use std::sync::{Arc, OnceLock};

use crate::auth::password::{hash_password_with_cost, verify_password};
use crate::error::AppError;
use crate::models::Identity;
use crate::store::CredentialStore;

/// Plaintext behind the hash compared against when the username is unknown.
const DUMMY_PASSWORD: &str = "unknown-user-placeholder";

/// Verifies username/password pairs against a [`CredentialStore`].
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    /// Work factor of the dummy hash. Should match the cost stored hashes use.
    hash_cost: u32,
    dummy_hash: Arc<OnceLock<String>>,
}

impl Authenticator {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            hash_cost: DEFAULT_COST,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Overrides the dummy hash work factor.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Returns the stored identity if `password` matches its hash.
    ///
    /// An unknown username and a wrong password both yield
    /// `AppError::InvalidCredentials`, and both pay for one bcrypt comparison:
    /// unknown usernames are checked against a lazily built dummy hash. The
    /// comparison runs on the blocking thread pool.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Identity, AppError> {
        let identity = match self.store.find_by_username(username).await? {
            Some(identity) => identity,
            None => {
                self.verify_against_dummy(password).await?;
                log::info!("Login rejected for unknown user");
                return Err(AppError::InvalidCredentials);
            }
        };

        let password = password.to_owned();
        let hash = identity.password_hash.clone();
        let matches = web::block(move || verify_password(&password, &hash)).await?;

        if matches {
            log::info!("User {} authenticated", identity.username);
            Ok(identity)
        } else {
            log::info!("Login rejected for user {}: wrong password", identity.username);
            Err(AppError::InvalidCredentials)
        }
    }

    async fn verify_against_dummy(&self, password: &str) -> Result<(), AppError> {
        let password = password.to_owned();
        let cached = self.dummy_hash.get().cloned();
        let cost = self.hash_cost;

        let hash = web::block(move || -> Result<String, AppError> {
            let hash = match cached {
                Some(hash) => hash,
                None => hash_password_with_cost(DUMMY_PASSWORD, cost)?,
            };
            verify_password(&password, &hash);
            Ok(hash)
        })
        .await??;

        // Concurrent first logins may race here; any of their hashes will do.
        let _ = self.dummy_hash.set(hash);
        Ok(())
    }
}
