use crate::{
    auth::{
        hash_password, LoginRequest, LoginResponse, RegisterRequest, TokenIssuer, JWT_COOKIE_NAME,
    },
    error::AppError,
    models::{NewUser, Role},
    store::CredentialStore,
};
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

/// Login user
///
/// Verifies the credential pair and, on success, sets the `jwtToken` cookie and
/// returns the role with a role-dependent redirect hint. Every failure is the
/// same generic 401.
#[post("/login")]
pub async fn login(
    issuer: web::Data<TokenIssuer>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let outcome = issuer
        .login(&login_data.username, &login_data.password, Utc::now())
        .await?;
    let role = outcome.identity.role;

    Ok(HttpResponse::Ok()
        .cookie(issuer.session_cookie(&outcome.token))
        .json(LoginResponse {
            message: "User login successful".to_string(),
            username: outcome.identity.username,
            role,
            redirect: role.home_path().to_string(),
        }))
}

/// Logout user
///
/// Expires the session cookie on the client. Safe to call any number of times.
#[post("/logout")]
pub async fn logout(issuer: web::Data<TokenIssuer>) -> impl Responder {
    HttpResponse::Ok()
        .cookie(issuer.logout_cookie())
        .json(json!({ "message": "Logged out" }))
}

/// Register a new user
///
/// Self-registered accounts always get the `USER` role. Does not log the user in.
#[post("/register")]
pub async fn register(
    store: web::Data<dyn CredentialStore>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    if store.exists_by_username(&register_data.username).await? {
        return Err(AppError::BadRequest("Username is taken".into()));
    }

    let RegisterRequest {
        username,
        email,
        password,
        first_name,
        last_name,
        age,
    } = register_data.into_inner();
    let password_hash = web::block(move || hash_password(&password)).await??;

    let identity = store
        .create(NewUser {
            username,
            email,
            password_hash,
            first_name,
            last_name,
            age,
            role: Role::User,
        })
        .await?;
    log::info!("Registered user {}", identity.username);

    Ok(HttpResponse::Created().json(json!({
        "message": "User has been registered successfully",
        "username": identity.username,
        "role": identity.role,
    })))
}

/// Reports whether the request carries a currently valid session token.
#[get("/authenticated")]
pub async fn authenticated(req: HttpRequest, issuer: web::Data<TokenIssuer>) -> impl Responder {
    let authenticated = req
        .cookie(JWT_COOKIE_NAME)
        .map(|cookie| issuer.codec().is_valid(cookie.value(), Utc::now()))
        .unwrap_or(false);

    HttpResponse::Ok().json(json!({ "authenticated": authenticated }))
}

/// Reports whether the session token belongs to an existing `ADMIN` account.
#[get("/is-admin")]
pub async fn is_admin(
    req: HttpRequest,
    issuer: web::Data<TokenIssuer>,
    store: web::Data<dyn CredentialStore>,
) -> Result<impl Responder, AppError> {
    let claims = req
        .cookie(JWT_COOKIE_NAME)
        .and_then(|cookie| issuer.codec().validate(cookie.value(), Utc::now()).ok());

    let admin = match claims {
        Some(claims) => store
            .find_by_username(&claims.sub)
            .await?
            .filter(|identity| identity.id == claims.uid)
            .map(|identity| identity.role == Role::Admin)
            .unwrap_or(false),
        None => false,
    };

    Ok(HttpResponse::Ok().json(json!({ "admin": admin })))
}
