use crate::{
    auth::{hash_password, CurrentUser},
    error::AppError,
    models::user::{AdminUserInput, AdminUserUpdate},
    models::{NewUser, Task, User},
    routes::users::USER_COLUMNS,
    store::CredentialStore,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Lists every account.
#[get("/users")]
pub async fn list_users(pool: web::Data<PgPool>) -> Result<impl Responder, AppError> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users ORDER BY id",
        USER_COLUMNS
    ))
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(users))
}

/// Creates an account with an explicit role.
#[post("/users")]
pub async fn create_user(
    store: web::Data<dyn CredentialStore>,
    input: web::Json<AdminUserInput>,
    admin: CurrentUser,
) -> Result<impl Responder, AppError> {
    input.validate()?;

    if store.exists_by_username(&input.username).await? {
        return Err(AppError::BadRequest("Username is taken".into()));
    }

    let AdminUserInput {
        username,
        email,
        password,
        first_name,
        last_name,
        age,
        role,
    } = input.into_inner();
    let password_hash = web::block(move || hash_password(&password)).await??;

    let identity = store
        .create(NewUser {
            username,
            email,
            password_hash,
            first_name,
            last_name,
            age,
            role,
        })
        .await?;
    log::info!(
        "Admin {} created user {} with role {}",
        admin.subject,
        identity.username,
        identity.role
    );

    Ok(HttpResponse::Created().json(json!({
        "id": identity.id,
        "username": identity.username,
        "role": identity.role,
    })))
}

/// Updates any account, including its role.
///
/// A role change takes effect on that user's next request, since every request
/// re-reads the account.
#[put("/users/{id}")]
pub async fn update_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<i64>,
    update: web::Json<AdminUserUpdate>,
    admin: CurrentUser,
) -> Result<impl Responder, AppError> {
    update.validate()?;

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users
         SET username = COALESCE($1, username),
             email = COALESCE($2, email),
             first_name = COALESCE($3, first_name),
             last_name = COALESCE($4, last_name),
             age = COALESCE($5, age),
             role = COALESCE($6, role)
         WHERE id = $7
         RETURNING {}",
        USER_COLUMNS
    ))
    .bind(&update.username)
    .bind(&update.email)
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(update.age)
    .bind(update.role)
    .bind(user_id.into_inner())
    .fetch_optional(&**pool)
    .await
    .map_err(AppError::unique_violation("Username or email is taken"))?
    .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    log::info!("Admin {} updated user {}", admin.subject, user.username);

    Ok(HttpResponse::Ok().json(user))
}

/// Deletes an account. Its outstanding tokens stop resolving immediately.
#[delete("/users/{id}")]
pub async fn delete_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<i64>,
    admin: CurrentUser,
) -> Result<impl Responder, AppError> {
    let user_id = user_id.into_inner();
    if user_id == admin.user_id {
        return Err(AppError::BadRequest(
            "Use /api/users/me to delete your own account".into(),
        ));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }
    log::info!("Admin {} deleted user {}", admin.subject, user_id);

    Ok(HttpResponse::NoContent().finish())
}

/// Lists every task across all users.
#[get("/tasks")]
pub async fn list_tasks(pool: web::Data<PgPool>) -> Result<impl Responder, AppError> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT id, title, description, priority, status, due_date, created_at, updated_at, user_id
         FROM tasks ORDER BY created_at DESC",
    )
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(tasks))
}
