pub mod authenticator;
pub mod context;
pub mod extractors;
pub mod issuer;
pub mod middleware;
pub mod password;
pub mod policy;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::USERNAME_REGEX;
use crate::models::Role;

// Re-export necessary items
pub use authenticator::Authenticator;
pub use context::SecurityContext;
pub use extractors::CurrentUser;
pub use issuer::{LoginOutcome, TokenIssuer, JWT_COOKIE_NAME};
pub use middleware::{AuthMiddleware, AuthorizationMiddleware};
pub use password::{hash_password, verify_password};
pub use policy::AuthorizationPolicy;
pub use token::{Claims, TokenCodec, TokenError};

/// Represents the payload for a user login request.
///
/// Only presence is validated: format rules would tell a caller which part of a
/// credential pair was wrong.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
///
/// There is no role field: self-registered accounts are always `USER`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Must be between 3 and 32 characters, alphanumeric, and can include underscores or hyphens.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(email)]
    pub email: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(range(min = 0, max = 150))]
    pub age: Option<i32>,
}

/// Response body of a successful login. The token itself travels only in the cookie.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub username: String,
    pub role: Role,
    /// Where the client should navigate next.
    pub redirect: String,
}
