use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A user-owned label that tasks can be filed under.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Association between one task and one category.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct TaskCategory {
    pub id: Uuid,
    pub task_id: Uuid,
    pub category_id: Uuid,
}

/// Body of the create/update association endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskCategoryInput {
    pub task_id: Uuid,
    pub category_id: Uuid,
}
