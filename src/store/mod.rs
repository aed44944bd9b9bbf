//! Credential storage behind the authentication layer.
//!
//! The auth core only ever reads identities through [`CredentialStore`]; the
//! Postgres implementation backs the running server and the in-memory one
//! backs tests and local experiments.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Identity, NewUser};

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Looks up an identity by its subject identifier.
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AppError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError>;

    /// Persists a new account. Fails with `BadRequest` if the username is taken.
    async fn create(&self, user: NewUser) -> Result<Identity, AppError>;
}
