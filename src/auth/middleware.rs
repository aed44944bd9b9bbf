use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use chrono::Utc;
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::context::SecurityContext;
use crate::auth::issuer::JWT_COOKIE_NAME;
use crate::auth::policy::AuthorizationPolicy;
use crate::auth::token::TokenCodec;
use crate::store::CredentialStore;

/// Resolves the session cookie into a [`SecurityContext`].
///
/// Never rejects a request: a missing, invalid or expired token, or one whose
/// subject no longer exists, simply leaves the context empty. Turning that into a
/// 401/403 is [`AuthorizationMiddleware`]'s job, so this must wrap outside it.
pub struct AuthMiddleware {
    codec: Arc<TokenCodec>,
    store: Arc<dyn CredentialStore>,
    policy: Arc<AuthorizationPolicy>,
}

impl AuthMiddleware {
    pub fn new(
        codec: Arc<TokenCodec>,
        store: Arc<dyn CredentialStore>,
        policy: Arc<AuthorizationPolicy>,
    ) -> Self {
        Self {
            codec,
            store,
            policy,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            codec: Arc::clone(&self.codec),
            store: Arc::clone(&self.store),
            policy: Arc::clone(&self.policy),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    codec: Arc<TokenCodec>,
    store: Arc<dyn CredentialStore>,
    policy: Arc<AuthorizationPolicy>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Public routes are exempt; they may carry a stale cookie without harm.
        if self.policy.is_public(req.match_info().as_str()) {
            return Box::pin(self.service.call(req));
        }

        let service = Rc::clone(&self.service);
        let codec = Arc::clone(&self.codec);
        let store = Arc::clone(&self.store);

        Box::pin(async move {
            let already_resolved = req.extensions().contains::<SecurityContext>();
            if !already_resolved {
                if let Some(context) = resolve_context(&req, &codec, store.as_ref()).await {
                    req.extensions_mut().insert(context);
                }
            }
            service.call(req).await
        })
    }
}

async fn resolve_context(
    req: &ServiceRequest,
    codec: &TokenCodec,
    store: &dyn CredentialStore,
) -> Option<SecurityContext> {
    let cookie = req.cookie(JWT_COOKIE_NAME)?;

    let claims = match codec.validate(cookie.value(), Utc::now()) {
        Ok(claims) => claims,
        Err(e) => {
            log::debug!("Ignoring session cookie on {}: {}", req.path(), e);
            return None;
        }
    };

    match store.find_by_username(&claims.sub).await {
        Ok(Some(identity)) if identity.id == claims.uid => {
            log::debug!("Request authenticated as {} ({})", identity.username, identity.role);
            Some(SecurityContext::from(&identity))
        }
        Ok(Some(identity)) => {
            log::info!(
                "Token for {} was issued to account {}, now held by {}",
                claims.sub,
                claims.uid,
                identity.id
            );
            None
        }
        Ok(None) => {
            log::info!("Token subject {} no longer exists", claims.sub);
            None
        }
        Err(e) => {
            log::warn!("Identity lookup for {} failed: {}", claims.sub, e);
            None
        }
    }
}

/// Enforces an [`AuthorizationPolicy`] against the context left by [`AuthMiddleware`].
pub struct AuthorizationMiddleware {
    policy: Arc<AuthorizationPolicy>,
}

impl AuthorizationMiddleware {
    pub fn new(policy: Arc<AuthorizationPolicy>) -> Self {
        Self { policy }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthorizationMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthorizationMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthorizationMiddlewareService {
            service,
            policy: Arc::clone(&self.policy),
        }))
    }
}

pub struct AuthorizationMiddlewareService<S> {
    service: S,
    policy: Arc<AuthorizationPolicy>,
}

impl<S, B> Service<ServiceRequest> for AuthorizationMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let decision = {
            let extensions = req.extensions();
            self.policy
                .check(req.match_info().as_str(), extensions.get::<SecurityContext>())
        };

        match decision {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(app_err) => {
                let response = req.error_response(app_err).map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}
