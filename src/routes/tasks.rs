use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{Task, TaskInput, TaskQuery},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str =
    "id, title, description, priority, status, due_date, created_at, updated_at, user_id";

/// Retrieves the authenticated user's tasks.
///
/// Supports filtering by `status`, `priority`, and a `search` term matched
/// case-insensitively against title and description. Newest first.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects.
/// - `401 Unauthorized`: no valid session.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    query_params: web::Query<TaskQuery>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let mut sql = format!("SELECT {} FROM tasks WHERE user_id = $1", TASK_COLUMNS);
    let mut param_count = 2;

    if query_params.status.is_some() {
        sql.push_str(&format!(" AND status = ${}", param_count));
        param_count += 1;
    }
    if query_params.priority.is_some() {
        sql.push_str(&format!(" AND priority = ${}", param_count));
        param_count += 1;
    }
    if query_params.search.is_some() {
        sql.push_str(&format!(
            " AND (title ILIKE ${0} OR description ILIKE ${0})",
            param_count
        ));
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(user.user_id);
    if let Some(status) = &query_params.status {
        query_builder = query_builder.bind(status);
    }
    if let Some(priority) = &query_params.priority {
        query_builder = query_builder.bind(priority);
    }
    if let Some(search) = &query_params.search {
        query_builder = query_builder.bind(format!("%{}%", search));
    }

    let tasks = query_builder.fetch_all(&**pool).await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `422 Unprocessable Entity`: `TaskInput` validation failed.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<TaskInput>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), user.user_id);

    let result = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, title, description, priority, status, due_date, user_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(task.id)
    .bind(task.title)
    .bind(task.description)
    .bind(task.priority)
    .bind(task.status)
    .bind(task.due_date)
    .bind(task.user_id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(result))
}

/// Retrieves one task. Tasks owned by someone else are reported as missing.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
        TASK_COLUMNS
    ))
    .bind(task_id.into_inner())
    .bind(user.user_id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Replaces a task's fields.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `404 Not Found`: no such task for this user.
/// - `422 Unprocessable Entity`: `TaskInput` validation failed.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let result = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks
         SET title = $1, description = $2, priority = $3, status = $4, due_date = $5, updated_at = NOW()
         WHERE id = $6 AND user_id = $7
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(&task_data.title)
    .bind(&task_data.description)
    .bind(&task_data.priority)
    .bind(&task_data.status)
    .bind(task_data.due_date)
    .bind(task_id.into_inner())
    .bind(user.user_id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found or not owned by user".into()))?;

    Ok(HttpResponse::Ok().json(result))
}

/// Deletes a task. Its category assignment goes with it.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id.into_inner())
        .bind(user.user_id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(
            "Task not found or not owned by user".into(),
        ));
    }

    Ok(HttpResponse::NoContent().finish())
}
