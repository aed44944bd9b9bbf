use actix_web::cookie::{time::Duration as CookieDuration, Cookie};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::auth::authenticator::Authenticator;
use crate::auth::token::TokenCodec;
use crate::error::AppError;
use crate::models::Identity;

/// Name of the cookie carrying the session token.
pub const JWT_COOKIE_NAME: &str = "jwtToken";

/// Result of a successful login.
#[derive(Debug)]
pub struct LoginOutcome {
    pub token: String,
    pub identity: Identity,
}

/// Turns verified credentials into a token and packages tokens as cookies.
///
/// The server keeps no session state: the cookie is the only record of a login.
pub struct TokenIssuer {
    authenticator: Authenticator,
    codec: Arc<TokenCodec>,
    secure_cookie: bool,
}

impl TokenIssuer {
    pub fn new(authenticator: Authenticator, codec: Arc<TokenCodec>, secure_cookie: bool) -> Self {
        Self {
            authenticator,
            codec,
            secure_cookie,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, AppError> {
        let identity = self.authenticator.authenticate(username, password).await?;
        let token = self
            .codec
            .issue(identity.id, &identity.username, identity.role, now)?;
        Ok(LoginOutcome { token, identity })
    }

    /// Cookie holding `token`, living exactly as long as the token itself.
    pub fn session_cookie(&self, token: &str) -> Cookie<'static> {
        Cookie::build(JWT_COOKIE_NAME, token.to_owned())
            .path("/")
            .http_only(true)
            .secure(self.secure_cookie)
            .max_age(CookieDuration::seconds(self.codec.validity().num_seconds()))
            .finish()
    }

    /// Empty cookie with max-age 0, telling the client to drop the carrier.
    ///
    /// The token itself stays valid until it expires; there is no server-side
    /// revocation list.
    pub fn logout_cookie(&self) -> Cookie<'static> {
        Cookie::build(JWT_COOKIE_NAME, "")
            .path("/")
            .http_only(true)
            .secure(self.secure_cookie)
            .max_age(CookieDuration::ZERO)
            .finish()
    }
}
