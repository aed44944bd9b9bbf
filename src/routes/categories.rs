use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{Category, CategoryInput},
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Lists the authenticated user's categories, alphabetically.
#[get("")]
pub async fn get_categories(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, user_id, created_at FROM categories WHERE user_id = $1 ORDER BY name",
    )
    .bind(user.user_id)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(categories))
}

#[get("/{id}")]
pub async fn get_category(
    pool: web::Data<PgPool>,
    category_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let category = sqlx::query_as::<_, Category>(
        "SELECT id, name, user_id, created_at FROM categories WHERE id = $1 AND user_id = $2",
    )
    .bind(category_id.into_inner())
    .bind(user.user_id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    Ok(HttpResponse::Ok().json(category))
}

/// Creates a category. Names are unique per user.
///
/// ## Responses:
/// - `201 Created`: the new `Category`.
/// - `400 Bad Request`: the user already has a category with this name.
/// - `422 Unprocessable Entity`: empty or overlong name.
#[post("")]
pub async fn create_category(
    pool: web::Data<PgPool>,
    category_data: web::Json<CategoryInput>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    category_data.validate()?;

    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE user_id = $1 AND name = $2)",
    )
    .bind(user.user_id)
    .bind(&category_data.name)
    .fetch_one(&**pool)
    .await?;
    if exists {
        return Err(AppError::BadRequest("Category already exists".into()));
    }

    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name, user_id)
         VALUES ($1, $2, $3)
         RETURNING id, name, user_id, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(&category_data.name)
    .bind(user.user_id)
    .fetch_one(&**pool)
    .await
    .map_err(AppError::unique_violation("Category already exists"))?;

    Ok(HttpResponse::Created().json(category))
}

/// Deletes a category along with any task assignments pointing at it.
#[delete("/{id}")]
pub async fn delete_category(
    pool: web::Data<PgPool>,
    category_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
        .bind(category_id.into_inner())
        .bind(user.user_id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Category not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}
