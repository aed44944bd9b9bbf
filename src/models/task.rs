use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Normal priority.
    Medium,
    /// Should be handled soon.
    High,
    /// Needs attention now.
    Urgent,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet.
    Todo,
    /// Being worked on.
    InProgress,
    /// Finished, waiting for review.
    Review,
    /// Finished and accepted.
    Done,
}

/// Input structure for creating or updating a task.
/// An update replaces every field, so omitted optionals are cleared.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Short summary shown in lists.
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Free-form details.
    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Left unset when the caller does not care.
    pub priority: Option<TaskPriority>,

    /// When the task should be done by, in UTC.
    pub due_date: Option<DateTime<Utc>>,

    /// Workflow state. Required on create and update.
    pub status: TaskStatus,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Random UUID v4 assigned on creation.
    pub id: Uuid,
    /// Short summary shown in lists.
    pub title: String,
    /// Free-form details, if any.
    pub description: Option<String>,
    /// Priority, if one was set.
    pub priority: Option<TaskPriority>,
    /// Current workflow state.
    pub status: TaskStatus,
    /// Deadline, if any.
    pub due_date: Option<DateTime<Utc>>,
    /// Set once when the task is created.
    pub created_at: DateTime<Utc>,
    /// Bumped on every update.
    pub updated_at: DateTime<Utc>,
    /// Owner of the task; every task route is scoped to it.
    pub user_id: i64,
}

/// Query parameters for filtering the task list.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Only tasks in this state.
    pub status: Option<TaskStatus>,
    /// Only tasks with this priority.
    pub priority: Option<TaskPriority>,
    /// Case-insensitive match against title or description.
    pub search: Option<String>,
}

impl Task {
    /// Creates a new `Task` owned by `user_id`, with a fresh UUID and timestamps.
    pub fn new(input: TaskInput, user_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            priority: input.priority,
            status: input.status,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
            user_id,
        }
    }
}
