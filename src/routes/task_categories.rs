use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{Category, TaskCategory, TaskCategoryInput},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;

/// Both the task and the category must belong to the caller.
async fn ensure_owned(pool: &PgPool, input: &TaskCategoryInput, user_id: i64) -> Result<(), AppError> {
    let (owned,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = $1 AND user_id = $3)
            AND EXISTS(SELECT 1 FROM categories WHERE id = $2 AND user_id = $3)",
    )
    .bind(input.task_id)
    .bind(input.category_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    if owned {
        Ok(())
    } else {
        Err(AppError::NotFound("Task or category not found".into()))
    }
}

/// Lists every assignment on the caller's tasks.
#[get("")]
pub async fn get_task_categories(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let assignments = sqlx::query_as::<_, TaskCategory>(
        "SELECT tc.id, tc.task_id, tc.category_id
         FROM task_categories tc
         JOIN tasks t ON t.id = tc.task_id
         WHERE t.user_id = $1",
    )
    .bind(user.user_id)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(assignments))
}

/// Assigns a category to a task. A task holds at most one category.
#[post("")]
pub async fn create_task_category(
    pool: web::Data<PgPool>,
    input: web::Json<TaskCategoryInput>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    ensure_owned(&pool, &input, user.user_id).await?;

    let assignment = sqlx::query_as::<_, TaskCategory>(
        "INSERT INTO task_categories (id, task_id, category_id)
         VALUES ($1, $2, $3)
         RETURNING id, task_id, category_id",
    )
    .bind(Uuid::new_v4())
    .bind(input.task_id)
    .bind(input.category_id)
    .fetch_one(&**pool)
    .await
    .map_err(AppError::unique_violation("Task already has a category"))?;

    Ok(HttpResponse::Created().json(assignment))
}

/// Moves a task to another category.
#[put("")]
pub async fn update_task_category(
    pool: web::Data<PgPool>,
    input: web::Json<TaskCategoryInput>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    ensure_owned(&pool, &input, user.user_id).await?;

    let assignment = sqlx::query_as::<_, TaskCategory>(
        "UPDATE task_categories SET category_id = $1
         WHERE task_id = $2
         RETURNING id, task_id, category_id",
    )
    .bind(input.category_id)
    .bind(input.task_id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("No category assigned to task".into()))?;

    Ok(HttpResponse::Ok().json(assignment))
}

/// Returns the category assigned to a task, or `204 No Content` when there is none.
#[get("/{task_id}")]
pub async fn get_category_for_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let category = sqlx::query_as::<_, Category>(
        "SELECT c.id, c.name, c.user_id, c.created_at
         FROM categories c
         JOIN task_categories tc ON tc.category_id = c.id
         JOIN tasks t ON t.id = tc.task_id
         WHERE tc.task_id = $1 AND t.user_id = $2",
    )
    .bind(task_id.into_inner())
    .bind(user.user_id)
    .fetch_optional(&**pool)
    .await?;

    Ok(match category {
        Some(category) => HttpResponse::Ok().json(category),
        None => HttpResponse::NoContent().finish(),
    })
}

/// Clears a task's category. Succeeds even if none was assigned.
#[delete("/{task_id}")]
pub async fn delete_task_category(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    sqlx::query(
        "DELETE FROM task_categories tc
         USING tasks t
         WHERE tc.task_id = t.id AND tc.task_id = $1 AND t.user_id = $2",
    )
    .bind(task_id.into_inner())
    .bind(user.user_id)
    .execute(&**pool)
    .await?;

    Ok(HttpResponse::NoContent().finish())
}
