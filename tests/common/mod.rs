#![allow(dead_code)]

use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    get, test, web, App, HttpResponse,
};
use serde_json::json;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;

use tasker::auth::password::{hash_password_with_cost, MIN_HASH_COST};
use tasker::auth::{
    AuthMiddleware, Authenticator, AuthorizationMiddleware, AuthorizationPolicy, CurrentUser,
    TokenCodec, TokenIssuer,
};
use tasker::models::{Identity, Role};
use tasker::routes::{self, health};
use tasker::store::{CredentialStore, MemoryCredentialStore};

pub const TEST_SECRET: &[u8] = b"integration-test-secret-0123456789abcdef";

/// Shared state of one test application: a memory store seeded with
/// `alice` (USER, password "correct") and `root` (ADMIN, password "toor").
pub struct TestContext {
    pub store: Arc<MemoryCredentialStore>,
    pub codec: Arc<TokenCodec>,
    pub policy: Arc<AuthorizationPolicy>,
    pub secure_cookie: bool,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryCredentialStore::new());
        store.insert(identity(1, "alice", "correct", Role::User));
        store.insert(identity(2, "root", "toor", Role::Admin));

        Self {
            store,
            codec: Arc::new(TokenCodec::new(TEST_SECRET)),
            policy: Arc::new(AuthorizationPolicy::standard().unwrap()),
            secure_cookie: true,
        }
    }

    pub fn dyn_store(&self) -> Arc<dyn CredentialStore> {
        self.store.clone()
    }

    pub fn issuer(&self) -> TokenIssuer {
        TokenIssuer::new(
            Authenticator::new(self.dyn_store()).with_hash_cost(MIN_HASH_COST),
            Arc::clone(&self.codec),
            self.secure_cookie,
        )
    }

    /// A valid token for `username`, issued now. Unknown names get account id 0.
    pub fn token_for(&self, username: &str, role: Role) -> String {
        let user_id = self.store.get(username).map(|i| i.id).unwrap_or(0);
        self.codec
            .issue(user_id, username, role, chrono::Utc::now())
            .unwrap()
    }
}

pub fn identity(id: i64, username: &str, password: &str, role: Role) -> Identity {
    Identity {
        id,
        username: username.to_string(),
        password_hash: hash_password_with_cost(password, MIN_HASH_COST).unwrap(),
        role,
    }
}

/// Pool that never connects. Routes exercised here reject or answer before
/// touching the database.
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://tasker@localhost/tasker_unused")
        .unwrap()
}

#[get("/user/home")]
pub async fn user_home(user: CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "subject": user.subject, "role": user.role }))
}

#[get("/admin/home")]
pub async fn admin_home(user: CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "subject": user.subject, "role": user.role }))
}

/// The full application wired the way `main` wires it, over the test context.
pub async fn init_app(
    ctx: &TestContext,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    let store = ctx.dyn_store();
    test::init_service(
        App::new()
            .app_data(web::Data::new(lazy_pool()))
            .app_data(web::Data::from(Arc::clone(&store)))
            .app_data(web::Data::new(ctx.issuer()))
            .wrap(AuthorizationMiddleware::new(Arc::clone(&ctx.policy)))
            .wrap(AuthMiddleware::new(
                Arc::clone(&ctx.codec),
                store,
                Arc::clone(&ctx.policy),
            ))
            .service(user_home)
            .service(admin_home)
            .service(health::health)
            .configure(routes::config),
    )
    .await
}
