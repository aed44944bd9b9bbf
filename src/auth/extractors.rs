use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use std::ops::Deref;

use crate::auth::context::SecurityContext;
use crate::error::AppError;

/// Extracts the request's [`SecurityContext`] from its extensions.
///
/// Intended for routes behind `AuthMiddleware`. When no context was installed the
/// extractor fails with `AppError::Unauthenticated`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SecurityContext);

impl Deref for CurrentUser {
    type Target = SecurityContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<SecurityContext>().cloned() {
            Some(context) => ready(Ok(CurrentUser(context))),
            None => ready(Err(AppError::Unauthenticated.into())),
        }
    }
}
