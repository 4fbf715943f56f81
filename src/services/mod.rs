//! Business logic over the SQLite store, one service per aggregate.

pub mod content_service;
pub mod exam_service;
pub mod flashcard_service;
pub mod question_service;
pub mod schedule_service;

use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: String },
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }
}

/// Map `RowNotFound` onto a typed not-found error, pass anything else through.
pub(crate) fn row_or_not_found(
    entity: &'static str,
    id: impl ToString,
) -> impl FnOnce(sqlx::Error) -> ServiceError {
    move |err| match err {
        sqlx::Error::RowNotFound => ServiceError::not_found(entity, id),
        other => ServiceError::Sqlx(other),
    }
}

/// Return true if SQLx error indicates a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}

/// Trim a required text field and reject it when empty or too long.
pub(crate) fn required_text(field: &str, value: &str, max_len: usize) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(format!("{} must not be empty", field)));
    }
    if trimmed.chars().count() > max_len {
        return Err(ServiceError::validation(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(trimmed.to_string())
}

/// Normalize an optional text field: trim it and drop it when blank.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Check that a referenced exam exists.
pub(crate) async fn ensure_exam_exists(db: &SqlitePool, id: Uuid) -> ServiceResult<()> {
    let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM exams WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    match found {
        Some(_) => Ok(()),
        None => Err(ServiceError::validation(format!("exam `{}` does not exist", id))),
    }
}
