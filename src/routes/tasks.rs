use crate::{
    auth::Identity,
    error::AppError,
    models::{
        task::{CREATE_TASK_SCHEMA, UPDATE_TASK_SCHEMA},
        Task, TaskChanges, TaskInput,
    },
    response::Envelope,
    state::AppState,
    validation::validate,
};
use actix_web::{delete, get, post, route, web};
use serde_json::Value;
use uuid::Uuid;

/// Retrieves every task owned by the authenticated user.
///
/// ## Responses:
/// - `200 OK`: the tasks, oldest first.
/// - `401 Unauthorized`: missing or invalid credential.
/// - `404 Not Found`: the user has no tasks.
#[get("")]
pub async fn get_tasks(
    identity: Identity,
    state: web::Data<AppState>,
) -> Result<Envelope, AppError> {
    let tasks = state.store.find_tasks_by_owner(identity.id).await?;
    if tasks.is_empty() {
        return Err(AppError::NotFound("No tasks found for this user.".into()));
    }

    Ok(Envelope::ok(
        "Tasks retrieved successfully.",
        Some(serde_json::to_value(&tasks)?),
    ))
}

/// Creates a new task for the authenticated user.
///
/// ## Request Body:
/// - `title`: 3 to 100 characters (required).
/// - `description` (optional, nullable): at most 500 characters.
/// - `status`: "pending", "in_progress" or "completed" (required).
/// - `dueDate` (optional, nullable): a date that is not in the past.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `400 Bad Request`: validation issues; nothing is stored.
/// - `401 Unauthorized`: missing or invalid credential.
#[post("/create")]
pub async fn create_task(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> Result<Envelope, AppError> {
    let input: TaskInput = validate(&body.into_inner(), &CREATE_TASK_SCHEMA)?;

    let task = state
        .store
        .create_task(Task::new(input, identity.id))
        .await?;

    Ok(Envelope::created(
        "Task has been created successfully.",
        Some(serde_json::to_value(&task)?),
    ))
}

/// Retrieves one task owned by the authenticated user.
#[get("/{task_id}")]
pub async fn get_task(
    identity: Identity,
    state: web::Data<AppState>,
    task_id: web::Path<String>,
) -> Result<Envelope, AppError> {
    let task_id = parse_task_id(&task_id)?;

    let task = state
        .store
        .find_task_by_id(task_id, identity.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task is not found by the id.".into()))?;

    Ok(Envelope::ok(
        "Tasks retrieved successfully.",
        Some(serde_json::to_value(&task)?),
    ))
}

/// Updates the fields present in the body. `null` clears `description` and
/// `dueDate`.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `400 Bad Request`: malformed id or validation issues.
/// - `401 Unauthorized`: missing or invalid credential.
/// - `404 Not Found`: no such task for this user.
#[route("/{task_id}", method = "PUT", method = "PATCH")]
pub async fn update_task(
    identity: Identity,
    state: web::Data<AppState>,
    task_id: web::Path<String>,
    body: web::Json<Value>,
) -> Result<Envelope, AppError> {
    let task_id = parse_task_id(&task_id)?;
    let changes: TaskChanges = validate(&body.into_inner(), &UPDATE_TASK_SCHEMA)?;

    let task = state
        .store
        .update_task(task_id, identity.id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found to update.".into()))?;

    Ok(Envelope::ok(
        "Task updated successfully.",
        Some(serde_json::to_value(&task)?),
    ))
}

/// Deletes one task owned by the authenticated user.
#[delete("/{task_id}")]
pub async fn delete_task(
    identity: Identity,
    state: web::Data<AppState>,
    task_id: web::Path<String>,
) -> Result<Envelope, AppError> {
    let task_id = parse_task_id(&task_id)?;

    state
        .store
        .delete_task(task_id, identity.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found to delete.".into()))?;

    Ok(Envelope::ok("Task deleted successfully.", None))
}

fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid task id.".into()))
}
