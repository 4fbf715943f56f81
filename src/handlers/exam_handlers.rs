//! Handlers for exams and their submissions.

use crate::{
    AppState,
    errors::AppError,
    models::exam::{Exam, ExamDetail, ExamInput, ExamQuestionsInput, Submission, SubmissionInput},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// GET `/api/exams`
pub async fn list_exams(State(state): State<AppState>) -> Result<Json<Vec<Exam>>, AppError> {
    Ok(Json(state.exams.list().await?))
}

/// POST `/api/exams`
pub async fn create_exam(
    State(state): State<AppState>,
    Json(input): Json<ExamInput>,
) -> Result<impl IntoResponse, AppError> {
    let exam = state.exams.create(input).await?;
    Ok((StatusCode::CREATED, Json(exam)))
}

/// GET `/api/exams/{id}`: the exam with its questions in order.
pub async fn get_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExamDetail>, AppError> {
    Ok(Json(state.exams.get_detail(id).await?))
}

/// PUT `/api/exams/{id}`
pub async fn update_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ExamInput>,
) -> Result<Json<Exam>, AppError> {
    Ok(Json(state.exams.update(id, input).await?))
}

/// DELETE `/api/exams/{id}`
pub async fn delete_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.exams.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT `/api/exams/{id}/questions`: replace the question list.
pub async fn set_exam_questions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ExamQuestionsInput>,
) -> Result<Json<ExamDetail>, AppError> {
    Ok(Json(state.exams.set_questions(id, input.question_ids).await?))
}

/// POST `/api/exams/{id}/submissions`: grade answers and store the TRI score.
pub async fn submit_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SubmissionInput>,
) -> Result<impl IntoResponse, AppError> {
    let submission = state.exams.submit(id, input).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

/// GET `/api/exams/{id}/submissions`
pub async fn list_exam_submissions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Submission>>, AppError> {
    Ok(Json(state.exams.list_submissions(id).await?))
}

/// GET `/api/submissions/{id}`
pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Submission>, AppError> {
    Ok(Json(state.exams.get_submission(id).await?))
}

/// GET `/api/users/{user_id}/submissions`
pub async fn user_submissions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Submission>>, AppError> {
    Ok(Json(state.exams.user_submissions(&user_id).await?))
}
