use async_trait::async_trait;
use sqlx::PgPool;

use super::CredentialStore;
use crate::error::AppError;
use crate::models::{Identity, NewUser};

/// Credential store backed by the `users` table.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AppError> {
        let identity = sqlx::query_as::<_, Identity>(
            "SELECT id, username, password_hash, role FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(identity)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists.0)
    }

    async fn create(&self, user: NewUser) -> Result<Identity, AppError> {
        sqlx::query_as::<_, Identity>(
            "INSERT INTO users (username, email, password_hash, first_name, last_name, age, role)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, username, password_hash, role",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.age)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::unique_violation("Username or email is taken"))
    }
}
