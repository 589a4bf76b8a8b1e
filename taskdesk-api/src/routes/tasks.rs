/// Task endpoints
///
/// All routes here sit behind [`require_auth`](crate::middleware::auth::require_auth)
/// and act only on the caller's own tasks. The owner always comes from the
/// authenticated identity; an `owner` field in a request body is ignored.
///
/// # Endpoints
///
/// - `GET    /api/tasks`     - List own tasks
/// - `POST   /api/tasks`     - Create a task
/// - `GET    /api/tasks/:id` - Get one task
/// - `PUT    /api/tasks/:id` - Partially update a task
/// - `DELETE /api/tasks/:id` - Delete a task
///
/// A task that does not exist, belongs to someone else, or whose ID is not a
/// UUID all yield the same 404.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskdesk_shared::{
    auth::middleware::AuthContext,
    models::task::{Task, TaskPatch},
    task_access::TaskError,
};
use uuid::Uuid;

/// Create task request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Title; missing is treated as empty and rejected
    #[serde(default)]
    pub title: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Delete task response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteTaskResponse {
    /// Confirmation message
    pub message: String,
}

/// Parses a path ID; anything that is not a UUID cannot be one of the caller's tasks
fn parse_task_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::from(TaskError::NotFound))
}

/// List tasks
///
/// Returns the caller's tasks in creation order.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.tasks.list(auth.user_id).await?;
    Ok(Json(tasks))
}

/// Create a task
///
/// # Endpoint
///
/// ```text
/// POST /api/tasks
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {
///   "title": "Buy milk",
///   "description": "2 litres"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing or blank title
/// - `401 Unauthorized`: Missing or invalid token
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(req) = body?;

    let task = state
        .tasks
        .create(auth.user_id, &req.title, req.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Get a task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task_id = parse_task_id(&id)?;
    let task = state.tasks.get(auth.user_id, task_id).await?;
    Ok(Json(task))
}

/// Update a task
///
/// Only fields present in the body change. `"completed": false` marks the
/// task incomplete again; `"description": null` clears the description. An
/// empty body object returns the task unchanged.
///
/// # Errors
///
/// - `400 Bad Request`: Blank title or malformed body
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: No such task for this user
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    body: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let task_id = parse_task_id(&id)?;
    let Json(patch) = body?;

    let task = state.tasks.update(auth.user_id, task_id, patch).await?;
    Ok(Json(task))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    let task_id = parse_task_id(&id)?;
    state.tasks.delete(auth.user_id, task_id).await?;

    Ok(Json(DeleteTaskResponse {
        message: "Task removed".to_string(),
    }))
}
