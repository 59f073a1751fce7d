/// Task endpoints
///
/// All routes require a session token (see `app::jwt_auth_layer`).
///
/// - `POST /tasks` - Create a task
/// - `GET /tasks` - List tasks assigned to the requester
/// - `GET /tasks/:id` - Get a task
/// - `POST /tasks/:id` - Advance a task to its next status

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskflow_shared::{
    auth::middleware::AuthContext,
    models::task::{Task, TaskStatus},
    services::tasks::NewTask,
};
use validator::Validate;

/// Create task request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateTaskRequest {
    #[validate(
        custom(function = "super::required", message = "name is required"),
        length(max = 255, message = "name must be at most 255 characters")
    )]
    pub name: String,

    /// Initial status, `TODO` when omitted
    pub status: Option<TaskStatus>,

    /// Assignee, the requester when omitted
    pub assigned_to_id: Option<i64>,

    pub project_id: Option<i64>,
}

/// Create a task
///
/// # Endpoint
///
/// ```text
/// POST /tasks
/// Authorization: <token>
///
/// { "name": "Write report", "project_id": 3 }
/// ```
///
/// # Response
///
/// `201 Created` with the stored task.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(req) = payload?;
    req.validate()
        .map_err(|e| ApiError::from_validation(e, &["name"]))?;

    let task = state
        .tasks
        .create(
            auth.user_id,
            NewTask {
                name: req.name,
                status: req.status,
                assigned_to_id: req.assigned_to_id,
                project_id: req.project_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// List tasks assigned to the requester, oldest first
///
/// Returns `[]` when nothing is assigned.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.tasks.list_assigned_to(auth.user_id).await?;
    Ok(Json(tasks))
}

/// Get a task by ID
///
/// # Errors
///
/// - `400 Bad Request`: ID is not an integer
/// - `404 Not Found`: No such task
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;
    let task = state.tasks.get(id).await?;
    Ok(Json(task))
}

/// Advance a task one status and return it as stored afterwards
///
/// # Errors
///
/// - `400 Bad Request`: ID is not an integer, the task is already `DONE`,
///   or a concurrent request advanced it first
/// - `404 Not Found`: No such task
pub async fn advance_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;
    let task = state.tasks.advance(id).await?;
    Ok(Json(task))
}

fn parse_task_id(raw: &str) -> ApiResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::invalid_field("id", format!("invalid task id '{}'", raw)))
}
