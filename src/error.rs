//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Authentication outcomes that can reach a client (bad credentials, missing identity,
//! insufficient role) each have their own variant, next to the generic CRUD failures.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so handlers and middleware can
//! return it directly and Actix turns it into a JSON body of the form `{"error": "..."}`.
//! Token parsing failures live in [`crate::auth::token::TokenError`] instead and never
//! leave the authentication layer.

use actix_web::{error::BlockingError, error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Message returned for every failed login, whatever the underlying cause.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// Represents all possible errors that can occur within the application.
///
/// Each variant corresponds to a specific type of error, often carrying a message
/// detailing the issue. These errors are then converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Login rejected (HTTP 401). Unknown username and wrong password are reported
    /// identically so the response cannot be used to enumerate accounts.
    InvalidCredentials,
    /// No valid identity on a protected route (HTTP 401).
    Unauthenticated,
    /// A valid identity whose role does not satisfy the route (HTTP 403).
    Forbidden,
    /// Represents a client-side error due to a malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// Represents a situation where a requested resource was not found (HTTP 404).
    NotFound(String),
    /// Represents an unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Represents an error originating from database operations (HTTP 500).
    /// The detail is logged, the client only sees a generic message.
    DatabaseError(String),
    /// Represents an error due to failed input validation (HTTP 422 Unprocessable Entity).
    ValidationError(String),
}

impl AppError {
    /// Error mapper for writes guarded by a unique constraint: a violation becomes
    /// `BadRequest(message)`, anything else converts as usual.
    ///
    /// ```ignore
    /// query.execute(pool).await.map_err(AppError::unique_violation("Username is taken"))?;
    /// ```
    pub fn unique_violation(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
        move |error| {
            if let sqlx::Error::Database(db) = &error {
                if db.is_unique_violation() {
                    return AppError::BadRequest(message.into());
                }
            }
            AppError::from(error)
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::Unauthenticated => write!(f, "Unauthenticated"),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            AppError::Unauthenticated => "Authentication required".to_string(),
            AppError::Forbidden => "Access forbidden".to_string(),
            AppError::BadRequest(msg) | AppError::NotFound(msg) | AppError::ValidationError(msg) => {
                msg.clone()
            }
            AppError::InternalServerError(msg) => {
                log::error!("internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::DatabaseError(msg) => {
                log::error!("database error: {}", msg);
                "Database error".to_string()
            }
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`; everything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("Password hashing failed: {}", error))
    }
}

/// A blocking task (password hashing) was cancelled or panicked.
impl From<BlockingError> for AppError {
    fn from(error: BlockingError) -> AppError {
        AppError::InternalServerError(format!("Blocking task failed: {}", error))
    }
}
