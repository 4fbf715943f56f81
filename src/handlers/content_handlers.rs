//! Handlers for `/api/content/{kind}`: the six levels of the content tree.

use crate::{
    AppState,
    errors::AppError,
    models::content::{ContentNode, NodeInput, NodeKind, ReorderInput},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListContentQuery {
    pub parent_id: Option<Uuid>,
}

fn parse_kind(segment: &str) -> Result<NodeKind, AppError> {
    segment.parse().map_err(AppError::not_found)
}

/// GET `/api/content/{kind}`: list nodes, `?parent_id=` narrows to one parent.
pub async fn list_nodes(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(q): Query<ListContentQuery>,
) -> Result<Json<Vec<ContentNode>>, AppError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.content.list(kind, q.parent_id).await?))
}

/// POST `/api/content/{kind}`
pub async fn create_node(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(input): Json<NodeInput>,
) -> Result<impl IntoResponse, AppError> {
    let kind = parse_kind(&kind)?;
    let node = state.content.create(kind, input).await?;
    Ok((StatusCode::CREATED, Json(node)))
}

/// GET `/api/content/{kind}/{id}`
pub async fn get_node(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<ContentNode>, AppError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.content.get(kind, id).await?))
}

/// PUT `/api/content/{kind}/{id}`
pub async fn update_node(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(input): Json<NodeInput>,
) -> Result<Json<ContentNode>, AppError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.content.update(kind, id, input).await?))
}

/// DELETE `/api/content/{kind}/{id}`: removes the node and its subtree.
pub async fn delete_node(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, AppError> {
    let kind = parse_kind(&kind)?;
    state.content.delete(kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/api/content/{kind}/{id}/children`
pub async fn node_children(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<Vec<ContentNode>>, AppError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.content.children(kind, id).await?))
}

/// GET `/api/content/{kind}/{id}/path`: breadcrumb from the sector down.
pub async fn node_path(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<Vec<ContentNode>>, AppError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.content.path(kind, id).await?))
}

/// POST `/api/content/{kind}/reorder`
pub async fn reorder_nodes(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(input): Json<ReorderInput>,
) -> Result<Json<Vec<ContentNode>>, AppError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.content.reorder(kind, input).await?))
}
