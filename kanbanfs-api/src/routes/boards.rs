/// Board endpoints
///
/// Boards live inside project files (`*.kanban`) and are kept densely
/// ordered from 0.
///
/// # Endpoints
///
/// - `GET /v1/nodes/:id/boards` - Boards of a project in order
/// - `POST /v1/nodes/:id/boards` - Append a board
/// - `PATCH /v1/boards/:id` - Rename
/// - `DELETE /v1/boards/:id` - Delete with its tasks
/// - `POST /v1/boards/:id/shift` - Move one place left or right, or any offset with wrap
/// - `POST /v1/boards/:id/move` - Move to an index, optionally in another project

use crate::{
    app::AppState,
    error::{validate_request, ApiError, ApiResult},
    middleware::identity::AuthContext,
    routes::{MoveRequest, Shift, ShiftRequest},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use kanbanfs_shared::models::board::{Board, NewBoard};
use kanbanfs_shared::models::node::{Node, NodeKind};
use kanbanfs_shared::ordering::{BoardsInFolder, ContainerKey};
use kanbanfs_shared::CoreError;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct BoardTitleRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
}

/// Loads a node that may hold boards
async fn project_node(state: &AppState, user_id: Uuid, node_id: Uuid) -> ApiResult<Node> {
    let node = Node::find_by_id_and_user(&state.db, node_id, user_id)
        .await?
        .ok_or_else(|| CoreError::node_not_found(node_id))?;

    if node.kind() != NodeKind::Project {
        warn!(user_id = %user_id, node_id = %node_id, name = %node.name, "Node is not a project");
        return Err(ApiError::BadRequest(format!(
            "'{}' is not a project; boards live in *.kanban files",
            node.name
        )));
    }
    Ok(node)
}

/// List a project's boards
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(node_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Board>>> {
    project_node(&state, auth.user_id, node_id).await?;

    let boards = Board::list_by_node(&state.db, auth.user_id, node_id).await?;
    Ok(Json(boards))
}

/// Append a board to a project
///
/// ```text
/// POST /v1/nodes/:id/boards
/// { "title": "Todo" }
/// ```
pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(node_id): Path<Uuid>,
    Json(req): Json<BoardTitleRequest>,
) -> ApiResult<(StatusCode, Json<Board>)> {
    validate_request(&req)?;
    project_node(&state, auth.user_id, node_id).await?;

    let board = state
        .order
        .insert::<BoardsInFolder>(
            ContainerKey::new(auth.user_id, node_id),
            NewBoard { title: req.title },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn update_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<BoardTitleRequest>,
) -> ApiResult<Json<Board>> {
    validate_request(&req)?;

    let board = Board::update_title(&state.db, id, auth.user_id, &req.title)
        .await?
        .ok_or_else(|| CoreError::board_not_found(id))?;
    Ok(Json(board))
}

pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Board>> {
    let board = state.order.locate::<BoardsInFolder>(auth.user_id, id).await?;
    let deleted = state
        .order
        .delete::<BoardsInFolder>(ContainerKey::of(auth.user_id, &board), id)
        .await?;
    Ok(Json(deleted))
}

/// Move a board one place
///
/// ```text
/// POST /v1/boards/:id/shift
/// { "direction": -1, "wrap": false }
/// ```
///
/// Without `wrap`, shifting the first board left or the last board right is a 400.
/// With `wrap`, `direction` may be any non-zero offset and is taken modulo the board count.
pub async fn shift_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ShiftRequest>,
) -> ApiResult<Json<Board>> {
    let shift = req.shift()?;

    let board = state.order.locate::<BoardsInFolder>(auth.user_id, id).await?;
    let key = ContainerKey::of(auth.user_id, &board);

    let shifted = match shift {
        Shift::Wrapping(delta) => {
            state
                .order
                .shift_wrapping::<BoardsInFolder>(key, id, delta)
                .await?
                .row
        }
        Shift::Step(direction) => {
            state.order.shift_by_one::<BoardsInFolder>(key, id, direction).await?
        }
    };
    Ok(Json(shifted))
}

/// Move a board to an index, in its own project or another one
///
/// ```text
/// POST /v1/boards/:id/move
/// { "node_id": "<project uuid>", "index": 0 }
/// ```
pub async fn move_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveRequest>,
) -> ApiResult<Json<Board>> {
    validate_request(&req)?;

    let board = state.order.locate::<BoardsInFolder>(auth.user_id, id).await?;
    let from = ContainerKey::of(auth.user_id, &board);

    let to = match req.to {
        Some(node_id) if node_id != board.node_id => {
            project_node(&state, auth.user_id, node_id).await?;
            ContainerKey::new(auth.user_id, node_id)
        }
        _ => from,
    };

    let moved = state
        .order
        .move_across::<BoardsInFolder>(id, from, to, req.index)
        .await?;
    Ok(Json(moved))
}
