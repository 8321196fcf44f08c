/// Folder and file endpoints
///
/// All paths in requests and responses are external paths: `/` is the user's
/// root folder and `/work/plan.kanban` a project two levels down.
///
/// # Endpoints
///
/// - `GET /v1/nodes?path=/work&children=true` - Resolve a path
/// - `GET /v1/nodes/:id/path` - Path of a node
/// - `POST /v1/nodes` - Create a folder or file
/// - `PATCH /v1/nodes/:id` - Rename and/or move
/// - `DELETE /v1/nodes/:id` - Delete with everything below it

use crate::{
    app::AppState,
    error::{validate_request, ApiResult},
    middleware::identity::AuthContext,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use kanbanfs_shared::models::node::{Node, NodeKind};
use kanbanfs_shared::paths::{path, NodeMove, NodePlacement};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub path: String,

    #[serde(default)]
    pub children: bool,
}

/// A node together with its external path
#[derive(Debug, Serialize)]
pub struct NodeResponse {
    #[serde(flatten)]
    pub node: Node,

    pub kind: NodeKind,

    pub path: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
}

impl NodeResponse {
    fn new(node: Node, path: String) -> Self {
        Self {
            kind: node.kind(),
            node,
            path,
            children: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NodePathResponse {
    pub id: Uuid,
    pub path: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNodeRequest {
    #[validate(length(min = 1, message = "Parent path is required"))]
    pub parent_path: String,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNodeRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct DeleteNodeResponse {
    pub deleted: bool,

    /// Path the node had; anything cached under it is gone
    pub path: String,
}

/// Resolve a path
///
/// ```text
/// GET /v1/nodes?path=/work&children=true
/// ```
pub async fn resolve_node(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ResolveQuery>,
) -> ApiResult<Json<NodeResponse>> {
    let canonical = path::normalize(&query.path)?;

    let response = if query.children {
        let resolved = state
            .paths
            .resolve_with_children(auth.user_id, &canonical)
            .await?;
        NodeResponse {
            children: Some(resolved.children),
            ..NodeResponse::new(resolved.node, canonical)
        }
    } else {
        let node = state.paths.resolve(auth.user_id, &canonical).await?;
        NodeResponse::new(node, canonical)
    };

    Ok(Json(response))
}

/// Path of a node
pub async fn node_path(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<NodePathResponse>> {
    let path = state.paths.path_of(auth.user_id, id).await?;
    Ok(Json(NodePathResponse { id, path }))
}

/// Create a folder or file
///
/// ```text
/// POST /v1/nodes
/// x-user-id: <uuid>
/// Content-Type: application/json
///
/// { "parent_path": "/work", "name": "plan.kanban" }
/// ```
///
/// Returns 409 when the path exists or is reserved, 404 when the parent is missing.
pub async fn create_node(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateNodeRequest>,
) -> ApiResult<(StatusCode, Json<NodeResponse>)> {
    validate_request(&req)?;

    let node = state
        .paths
        .create(auth.user_id, &req.parent_path, &req.name)
        .await?;
    let parent = path::normalize(&req.parent_path)?;
    let full_path = path::join(&parent, &node.name);

    Ok((StatusCode::CREATED, Json(NodeResponse::new(node, full_path))))
}

/// Rename and/or move a node
///
/// The response carries both the old and the new path.
pub async fn update_node(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNodeRequest>,
) -> ApiResult<Json<NodeMove>> {
    validate_request(&req)?;

    let moved = state
        .paths
        .rename_or_reparent(
            auth.user_id,
            id,
            NodePlacement {
                name: req.name,
                parent_id: req.parent_id,
            },
        )
        .await?;

    Ok(Json(moved))
}

/// Delete a node and its subtree
pub async fn delete_node(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteNodeResponse>> {
    let path = state.paths.delete(auth.user_id, id).await?;
    Ok(Json(DeleteNodeResponse { deleted: true, path }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_node_response_flattens_node() {
        let node = Node {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "plan.kanban".to_string(),
            parent_id: Some(Uuid::new_v4()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(NodeResponse::new(node.clone(), "/plan.kanban".into())).unwrap();
        assert_eq!(json["id"], serde_json::json!(node.id));
        assert_eq!(json["kind"], "project");
        assert_eq!(json["path"], "/plan.kanban");
        assert!(json.get("children").is_none());
    }

    #[test]
    fn test_create_request_validation() {
        let req = CreateNodeRequest {
            parent_path: "/".into(),
            name: String::new(),
        };
        assert!(req.validate().is_err());

        let req = UpdateNodeRequest {
            name: None,
            parent_id: None,
        };
        assert!(req.validate().is_ok());
    }
}
