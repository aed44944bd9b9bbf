use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;

use tasker::auth::{
    AuthMiddleware, Authenticator, AuthorizationMiddleware, AuthorizationPolicy, TokenCodec,
    TokenIssuer,
};
use tasker::config::Config;
use tasker::routes::{self, health};
use tasker::store::{CredentialStore, PgCredentialStore};

fn startup_error<E: std::fmt::Display>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

fn cors(allowed_origin: Option<&str>) -> Cors {
    match allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600),
        None => Cors::default(),
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(startup_error)?;

    let store: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(pool.clone()));
    let codec = Arc::new(TokenCodec::new(config.jwt_secret.as_bytes()));
    let policy = Arc::new(AuthorizationPolicy::standard().map_err(startup_error)?);
    let issuer = web::Data::new(TokenIssuer::new(
        Authenticator::new(Arc::clone(&store)),
        Arc::clone(&codec),
        config.cookie_secure,
    ));

    if !config.cookie_secure {
        log::warn!("COOKIE_SECURE is disabled; session cookies will be sent over plain HTTP");
    }
    log::info!("Starting Tasker server at {}", config.server_url());

    let cors_origin = config.cors_allowed_origin.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::from(Arc::clone(&store)))
            .app_data(issuer.clone())
            .wrap(AuthorizationMiddleware::new(Arc::clone(&policy)))
            .wrap(AuthMiddleware::new(
                Arc::clone(&codec),
                Arc::clone(&store),
                Arc::clone(&policy),
            ))
            .wrap(cors(cors_origin.as_deref()))
            .wrap(Logger::default())
            .service(health::health)
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
