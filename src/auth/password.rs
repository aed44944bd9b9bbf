use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};

/// Lowest work factor bcrypt accepts. Only test fixtures should hash at this cost.
pub const MIN_HASH_COST: u32 = 4;

/// Hashes a password with a fresh random salt at bcrypt's default cost.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks a password against a stored bcrypt hash.
///
/// bcrypt compares digests in constant time. A malformed hash is treated as a
/// mismatch, never as an error.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    match verify(password, hashed_password) {
        Ok(matches) => matches,
        Err(e) => {
            log::warn!("Stored password hash could not be parsed: {}", e);
            false
        }
    }
}
