//! Handlers for study schedules.

use crate::{
    AppState,
    errors::AppError,
    models::schedule::{Schedule, ScheduleFilter, ScheduleInput},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// GET `/api/schedules`: supports ?user_id=&from=&to= (RFC 3339)
pub async fn list_schedules(
    State(state): State<AppState>,
    Query(filter): Query<ScheduleFilter>,
) -> Result<Json<Vec<Schedule>>, AppError> {
    Ok(Json(state.schedules.list(filter).await?))
}

/// POST `/api/schedules`
pub async fn create_schedule(
    State(state): State<AppState>,
    Json(input): Json<ScheduleInput>,
) -> Result<impl IntoResponse, AppError> {
    let schedule = state.schedules.create(input).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

/// GET `/api/schedules/{id}`
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Schedule>, AppError> {
    Ok(Json(state.schedules.get(id).await?))
}

/// PUT `/api/schedules/{id}`
pub async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ScheduleInput>,
) -> Result<Json<Schedule>, AppError> {
    Ok(Json(state.schedules.update(id, input).await?))
}

/// POST `/api/schedules/{id}/complete`
pub async fn complete_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Schedule>, AppError> {
    Ok(Json(state.schedules.complete(id).await?))
}

/// DELETE `/api/schedules/{id}`
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.schedules.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
