//! Handlers for the question bank.

use crate::{
    AppState,
    errors::AppError,
    models::question::{Question, QuestionInput},
    services::question_service::{DEFAULT_PAGE_SIZE, QuestionCursor, QuestionFilter},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListQuestionsQuery {
    pub subject: Option<String>,
    pub lesson_id: Option<Uuid>,
    pub limit: Option<usize>,
    pub continuation_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuestionListResponse {
    pub questions: Vec<Question>,
    pub next_continuation_token: Option<String>,
}

/// GET `/api/questions`: supports ?subject=&lesson_id=&limit=&continuation_token=
pub async fn list_questions(
    State(state): State<AppState>,
    Query(q): Query<ListQuestionsQuery>,
) -> Result<Json<QuestionListResponse>, AppError> {
    let after = q
        .continuation_token
        .as_deref()
        .map(decode_continuation_token)
        .transpose()?;

    let page = state
        .questions
        .list(QuestionFilter {
            subject: q.subject,
            lesson_id: q.lesson_id,
            after,
            limit: q.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        })
        .await?;

    Ok(Json(QuestionListResponse {
        questions: page.questions,
        next_continuation_token: page.next.as_ref().map(encode_continuation_token),
    }))
}

/// POST `/api/questions`
pub async fn create_question(
    State(state): State<AppState>,
    Json(input): Json<QuestionInput>,
) -> Result<impl IntoResponse, AppError> {
    let question = state.questions.create(input).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// GET `/api/questions/{id}`
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Question>, AppError> {
    Ok(Json(state.questions.get(id).await?))
}

/// PUT `/api/questions/{id}`
pub async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<QuestionInput>,
) -> Result<Json<Question>, AppError> {
    Ok(Json(state.questions.update(id, input).await?))
}

/// DELETE `/api/questions/{id}`
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.questions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn encode_continuation_token(cursor: &QuestionCursor) -> String {
    let raw = format!(
        "{}|{}",
        cursor.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
        cursor.id
    );
    general_purpose::URL_SAFE_NO_PAD.encode(raw)
}

fn decode_continuation_token(token: &str) -> Result<QuestionCursor, AppError> {
    let invalid = || AppError::bad_request("invalid continuation_token");
    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| invalid())?;
    let raw = String::from_utf8(bytes).map_err(|_| invalid())?;
    let (created_at, id) = raw.split_once('|').ok_or_else(invalid)?;
    Ok(QuestionCursor {
        created_at: DateTime::parse_from_rfc3339(created_at)
            .map_err(|_| invalid())?
            .with_timezone(&Utc),
        id: id.parse().map_err(|_| invalid())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuation_token_survives_the_url() {
        let cursor = QuestionCursor {
            created_at: Utc::now(),
            id: Uuid::new_v4(),
        };
        let token = encode_continuation_token(&cursor);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(decode_continuation_token(&token).unwrap(), cursor);
    }

    #[test]
    fn garbage_token_is_a_bad_request() {
        let err = decode_continuation_token("not a token").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
