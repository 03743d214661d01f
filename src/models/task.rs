use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::{Field, Schema};

const DUE_DATE_IN_PAST: &str = "Due date must be in the future.";

lazy_static! {
    /// Rules for `POST /api/tasks/create`.
    pub static ref CREATE_TASK_SCHEMA: Schema = Schema::new()
        .field(
            Field::text("title")
                .required("Title is required.")
                .min_length(3, "Title must be at least 3 characters long.")
                .max_length(100, "Title must be at most 100 characters long.")
                .non_empty("Title cannot be empty."),
        )
        .field(
            Field::text("description")
                .optional()
                .nullable()
                .max_length(500, "Description must be at most 500 characters long."),
        )
        .field(Field::one_of("status", TaskStatus::VALUES).required("Status is required."))
        .field(
            Field::date("dueDate")
                .optional()
                .nullable()
                .not_in_past(DUE_DATE_IN_PAST),
        );

    /// Rules for `PUT|PATCH /api/tasks/{task_id}`. Every field is optional.
    pub static ref UPDATE_TASK_SCHEMA: Schema = Schema::new()
        .field(
            Field::text("title")
                .optional()
                .min_length(3, "Title must be at least 3 characters long.")
                .max_length(100, "Title must be at most 100 characters long."),
        )
        .field(
            Field::text("description")
                .optional()
                .nullable()
                .max_length(500, "Description must be at most 500 characters long."),
        )
        .field(
            Field::one_of("status", TaskStatus::VALUES)
                .optional()
                .type_message("Status must be one of: pending, in_progress, completed."),
        )
        .field(
            Field::date("dueDate")
                .optional()
                .nullable()
                .not_in_past(DUE_DATE_IN_PAST),
        );
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    Pending,
    /// Task is currently being worked on.
    InProgress,
    /// Task is done.
    Completed,
}

impl TaskStatus {
    /// Accepted wire values, in declaration order.
    pub const VALUES: &'static [&'static str] = &["pending", "in_progress", "completed"];
}

/// Validated input for creating a task.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
}

/// Validated partial update. For nullable fields the outer `Option` says
/// whether the field was sent and the inner one carries an explicit `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskChanges {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// Identifier of the user who owns the task.
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new `Task` owned by `user_id`, with fresh id and timestamps.
    pub fn new(input: TaskInput, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: input.title,
            description: input.description,
            status: input.status,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the fields present in `changes` and bumps `updated_at`.
    pub fn apply(&mut self, changes: TaskChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
        self.updated_at = Utc::now();
    }
}
