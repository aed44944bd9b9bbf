#![doc = "The `tasker` library crate."]
#![doc = ""]
#![doc = "Domain models, the credential store, cookie-carried JWT authentication,"]
#![doc = "role-based authorization middleware, route handlers and error handling for the"]
#![doc = "Tasker backend. The binary (`main.rs`) wires them into an `HttpServer`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use crate::error::AppError;
