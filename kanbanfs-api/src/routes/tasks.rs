/// Task endpoints
///
/// # Endpoints
///
/// - `GET /v1/boards/:id/tasks?archived=true` - Tasks of a board in order
/// - `POST /v1/boards/:id/tasks` - Append a task
/// - `PATCH /v1/tasks/:id` - Edit title, body, tags or archived flag
/// - `DELETE /v1/tasks/:id` - Delete
/// - `POST /v1/tasks/:id/shift` - Move one place up or down, or any offset with wrap
/// - `POST /v1/tasks/:id/move` - Move to an index, optionally on another board

use crate::{
    app::AppState,
    error::{validate_request, ApiError, ApiResult},
    middleware::identity::AuthContext,
    routes::{MoveRequest, Shift, ShiftRequest},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use kanbanfs_shared::models::board::Board;
use kanbanfs_shared::models::task::{NewTask, Task, UpdateTask};
use kanbanfs_shared::ordering::{ContainerKey, TasksInBoard};
use kanbanfs_shared::CoreError;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Include archived tasks
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[serde(default)]
    pub body: String,

    #[serde(default)]
    #[validate(length(max = 32, message = "At most 32 tags"))]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    pub body: Option<String>,

    #[validate(length(max = 32, message = "At most 32 tags"))]
    pub tags: Option<Vec<String>>,

    pub archived: Option<bool>,
}

/// List a board's tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    Board::find_by_id_and_user(&state.db, board_id, auth.user_id)
        .await?
        .ok_or_else(|| CoreError::board_not_found(board_id))?;

    let tasks = Task::list_by_board(&state.db, auth.user_id, board_id, query.archived).await?;
    Ok(Json(tasks))
}

/// Append a task to a board
///
/// ```text
/// POST /v1/boards/:id/tasks
/// { "title": "Write tests", "body": "", "tags": ["backend"] }
/// ```
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    validate_request(&req)?;

    let task = state
        .order
        .insert::<TasksInBoard>(
            ContainerKey::new(auth.user_id, board_id),
            NewTask {
                title: req.title,
                body: req.body,
                tags: req.tags,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Edit a task's content; its position is untouched
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    validate_request(&req)?;

    let update = UpdateTask {
        title: req.title,
        body: req.body,
        tags: req.tags,
        archived: req.archived,
    };
    if update.is_empty() {
        return Err(ApiError::BadRequest("Nothing to update".to_string()));
    }

    let task = Task::update(&state.db, id, auth.user_id, update)
        .await?
        .ok_or_else(|| CoreError::task_not_found(id))?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = state.order.locate::<TasksInBoard>(auth.user_id, id).await?;
    let deleted = state
        .order
        .delete::<TasksInBoard>(ContainerKey::of(auth.user_id, &task), id)
        .await?;
    Ok(Json(deleted))
}

/// Move a task one place
///
/// ```text
/// POST /v1/tasks/:id/shift
/// { "direction": 1, "wrap": true }
/// ```
pub async fn shift_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ShiftRequest>,
) -> ApiResult<Json<Task>> {
    let shift = req.shift()?;

    let task = state.order.locate::<TasksInBoard>(auth.user_id, id).await?;
    let key = ContainerKey::of(auth.user_id, &task);

    let shifted = match shift {
        Shift::Wrapping(delta) => {
            state
                .order
                .shift_wrapping::<TasksInBoard>(key, id, delta)
                .await?
                .row
        }
        Shift::Step(direction) => {
            state.order.shift_by_one::<TasksInBoard>(key, id, direction).await?
        }
    };
    Ok(Json(shifted))
}

/// Move a task to an index, on its own board or another one
///
/// ```text
/// POST /v1/tasks/:id/move
/// { "board_id": "<board uuid>", "index": 2 }
/// ```
///
/// Without `board_id` the task stays on its board; without `index` it goes last.
pub async fn move_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveRequest>,
) -> ApiResult<Json<Task>> {
    validate_request(&req)?;

    let task = state.order.locate::<TasksInBoard>(auth.user_id, id).await?;
    let from = ContainerKey::of(auth.user_id, &task);
    let to = ContainerKey::new(auth.user_id, req.to.unwrap_or(task.board_id));

    let moved = state
        .order
        .move_across::<TasksInBoard>(id, from, to, req.index)
        .await?;
    Ok(Json(moved))
}
