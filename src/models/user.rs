use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    pub static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Role assigned to a user.
/// Corresponds to the `user_role` SQL enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// Landing page a client should navigate to after logging in with this role.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::User => "/user/home",
            Role::Admin => "/admin/home",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored principal as seen by the authentication layer.
#[derive(Clone, PartialEq, Eq, FromRow)]
pub struct Identity {
    pub id: i64,
    /// Unique subject identifier carried in tokens.
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Public view of a user account. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// A fully prepared account, ready to be written to a credential store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub role: Role,
}

/// Account fields an authenticated user may change on their own profile.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(range(min = 0, max = 150))]
    pub age: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordChange {
    pub current_password: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}

/// Payload of the admin-only user creation endpoint; the only input that may
/// choose a role.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminUserInput {
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
    #[validate(length(min = 6))]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    #[serde(default)]
    pub role: Role,
}

/// Admin-side update of an existing account.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminUserUpdate {
    #[validate(length(min = 3, max = 32))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub role: Option<Role>,
}
