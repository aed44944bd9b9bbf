use crate::{
    auth::{hash_password, verify_password, CurrentUser, TokenIssuer},
    error::AppError,
    models::user::{PasswordChange, ProfileUpdate},
    models::User,
};
use actix_web::{delete, get, put, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

pub(crate) const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, age, role, created_at";

/// Returns the authenticated user's profile.
#[get("/me")]
pub async fn get_profile(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let profile = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = $1",
        USER_COLUMNS
    ))
    .bind(user.user_id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(profile))
}

/// Updates the authenticated user's profile.
///
/// Tokens are keyed by username, so a rename invalidates the current cookie;
/// the response carries a freshly issued one in that case.
#[put("/me")]
pub async fn update_profile(
    pool: web::Data<PgPool>,
    issuer: web::Data<TokenIssuer>,
    update: web::Json<ProfileUpdate>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    update.validate()?;

    let renamed = matches!(&update.username, Some(name) if *name != user.subject);
    if renamed {
        let (taken,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(&update.username)
                .fetch_one(&**pool)
                .await?;
        if taken {
            return Err(AppError::BadRequest("Username is taken".into()));
        }
    }

    let profile = sqlx::query_as::<_, User>(&format!(
        "UPDATE users
         SET username = COALESCE($1, username),
             email = COALESCE($2, email),
             first_name = COALESCE($3, first_name),
             last_name = COALESCE($4, last_name),
             age = COALESCE($5, age)
         WHERE id = $6
         RETURNING {}",
        USER_COLUMNS
    ))
    .bind(&update.username)
    .bind(&update.email)
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(update.age)
    .bind(user.user_id)
    .fetch_optional(&**pool)
    .await
    .map_err(AppError::unique_violation("Username or email is taken"))?
    .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let mut response = HttpResponse::Ok();
    if renamed {
        log::info!("User {} renamed to {}", user.subject, profile.username);
        let token = issuer
            .codec()
            .issue(profile.id, &profile.username, profile.role, Utc::now())?;
        response.cookie(issuer.session_cookie(&token));
    }

    Ok(response.json(profile))
}

/// Changes the password after re-verifying the current one.
#[put("/me/password")]
pub async fn change_password(
    pool: web::Data<PgPool>,
    change: web::Json<PasswordChange>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    change.validate()?;

    let (current_hash,): (String,) =
        sqlx::query_as("SELECT password_hash FROM users WHERE id = $1")
            .bind(user.user_id)
            .fetch_one(&**pool)
            .await?;

    let PasswordChange {
        current_password,
        new_password,
    } = change.into_inner();
    let new_hash = web::block(move || {
        if verify_password(&current_password, &current_hash) {
            hash_password(&new_password).map(Some)
        } else {
            Ok(None)
        }
    })
    .await??
    .ok_or_else(|| AppError::BadRequest("Current password is incorrect".into()))?;

    sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(new_hash)
        .bind(user.user_id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Password updated" })))
}

/// Deletes the authenticated user's account and clears the session cookie.
#[delete("/me")]
pub async fn delete_account(
    pool: web::Data<PgPool>,
    issuer: web::Data<TokenIssuer>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.user_id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }
    log::info!("User {} deleted their account", user.subject);

    Ok(HttpResponse::NoContent()
        .cookie(issuer.logout_cookie())
        .finish())
}
