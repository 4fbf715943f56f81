//! QuestionService: the question bank.

use super::{
    ServiceError, ServiceResult, content_service::ensure_lesson_exists, is_unique_violation,
    optional_text, required_text, row_or_not_found,
};
use crate::models::question::{Question, QuestionInput};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const MIN_ALTERNATIVES: usize = 2;
const MAX_ALTERNATIVES: usize = 5;
const MAX_STATEMENT_LEN: usize = 10_000;
const MAX_ALTERNATIVE_LEN: usize = 2_000;
pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 200;

pub(crate) const QUESTION_COLUMNS: &str = "id, statement, alternatives, correct_index, subject, \
                                           explanation, lesson_id, discrimination, difficulty, \
                                           guessing, fingerprint, created_at";

/// Position in the `(created_at, id)` ordering to resume listing after.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuestionCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    pub subject: Option<String>,
    pub lesson_id: Option<Uuid>,
    pub after: Option<QuestionCursor>,
    pub limit: usize,
}

#[derive(Debug)]
pub struct QuestionPage {
    pub questions: Vec<Question>,
    pub next: Option<QuestionCursor>,
}

#[derive(Clone)]
pub struct QuestionService {
    pub db: Arc<SqlitePool>,
}

/// Duplicate detection key: md5 over the lowercased statement with
/// whitespace runs collapsed.
pub fn fingerprint(statement: &str) -> String {
    let normalized = statement
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    format!("{:x}", md5::compute(normalized))
}

impl QuestionService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Validate and normalize a question payload.
    async fn normalize(&self, input: &QuestionInput) -> ServiceResult<QuestionInput> {
        let statement = required_text("statement", &input.statement, MAX_STATEMENT_LEN)?;

        let count = input.alternatives.len();
        if !(MIN_ALTERNATIVES..=MAX_ALTERNATIVES).contains(&count) {
            return Err(ServiceError::validation(format!(
                "a question needs between {} and {} alternatives, got {}",
                MIN_ALTERNATIVES, MAX_ALTERNATIVES, count
            )));
        }
        let alternatives = input
            .alternatives
            .iter()
            .enumerate()
            .map(|(i, alt)| required_text(&format!("alternative {}", i), alt, MAX_ALTERNATIVE_LEN))
            .collect::<ServiceResult<Vec<_>>>()?;

        if input.correct_index as usize >= count {
            return Err(ServiceError::validation(format!(
                "correct_index {} is out of range for {} alternatives",
                input.correct_index, count
            )));
        }

        let params = input.item_params();
        params.validate().map_err(ServiceError::validation)?;

        if let Some(lesson_id) = input.lesson_id {
            ensure_lesson_exists(&self.db, lesson_id).await?;
        }

        Ok(QuestionInput {
            statement,
            alternatives,
            correct_index: input.correct_index,
            subject: optional_text(input.subject.as_deref()),
            explanation: optional_text(input.explanation.as_deref()),
            lesson_id: input.lesson_id,
            discrimination: Some(params.discrimination),
            difficulty: Some(params.difficulty),
            guessing: Some(params.guessing),
        })
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Question> {
        sqlx::query_as::<_, Question>(&format!(
            "SELECT {} FROM questions WHERE id = ?",
            QUESTION_COLUMNS
        ))
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(row_or_not_found("question", id))
    }

    /// Page through the bank in `(created_at, id)` order.
    pub async fn list(&self, filter: QuestionFilter) -> ServiceResult<QuestionPage> {
        let limit = filter.limit.clamp(1, MAX_PAGE_SIZE);
        let fetch_limit = limit + 1;

        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM questions WHERE 1 = 1",
            QUESTION_COLUMNS
        ));
        if let Some(subject) = &filter.subject {
            builder.push(" AND subject = ");
            builder.push_bind(subject.clone());
        }
        if let Some(lesson_id) = filter.lesson_id {
            builder.push(" AND lesson_id = ");
            builder.push_bind(lesson_id);
        }
        if let Some(cursor) = filter.after {
            builder.push(" AND (created_at > ");
            builder.push_bind(cursor.created_at);
            builder.push(" OR (created_at = ");
            builder.push_bind(cursor.created_at);
            builder.push(" AND id > ");
            builder.push_bind(cursor.id);
            builder.push("))");
        }
        builder.push(" ORDER BY created_at ASC, id ASC LIMIT ");
        builder.push_bind(fetch_limit as i64);

        let mut questions: Vec<Question> = builder.build_query_as().fetch_all(&*self.db).await?;

        let mut next = None;
        if questions.len() == fetch_limit {
            questions.pop();
            next = questions.last().map(|q| QuestionCursor {
                created_at: q.created_at,
                id: q.id,
            });
        }

        Ok(QuestionPage { questions, next })
    }

    pub async fn create(&self, input: QuestionInput) -> ServiceResult<Question> {
        let input = self.normalize(&input).await?;
        let fingerprint = fingerprint(&input.statement);

        let result = sqlx::query_as::<_, Question>(&format!(
            "INSERT INTO questions ({})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {}",
            QUESTION_COLUMNS, QUESTION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.statement)
        .bind(sqlx::types::Json(&input.alternatives))
        .bind(input.correct_index)
        .bind(&input.subject)
        .bind(&input.explanation)
        .bind(input.lesson_id)
        .bind(input.discrimination)
        .bind(input.difficulty)
        .bind(input.guessing)
        .bind(&fingerprint)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await;

        match result {
            Ok(question) => {
                info!(id = %question.id, "created question");
                Ok(question)
            }
            Err(err) if is_unique_violation(&err) => Err(duplicate(&fingerprint)),
            Err(err) => Err(ServiceError::Sqlx(err)),
        }
    }

    pub async fn update(&self, id: Uuid, input: QuestionInput) -> ServiceResult<Question> {
        let input = self.normalize(&input).await?;
        let fingerprint = fingerprint(&input.statement);

        let result = sqlx::query_as::<_, Question>(&format!(
            "UPDATE questions
             SET statement = ?, alternatives = ?, correct_index = ?, subject = ?,
                 explanation = ?, lesson_id = ?, discrimination = ?, difficulty = ?,
                 guessing = ?, fingerprint = ?
             WHERE id = ?
             RETURNING {}",
            QUESTION_COLUMNS
        ))
        .bind(&input.statement)
        .bind(sqlx::types::Json(&input.alternatives))
        .bind(input.correct_index)
        .bind(&input.subject)
        .bind(&input.explanation)
        .bind(input.lesson_id)
        .bind(input.discrimination)
        .bind(input.difficulty)
        .bind(input.guessing)
        .bind(&fingerprint)
        .bind(id)
        .fetch_one(&*self.db)
        .await;

        match result {
            Ok(question) => Ok(question),
            Err(sqlx::Error::RowNotFound) => Err(ServiceError::not_found("question", id)),
            Err(err) if is_unique_violation(&err) => Err(duplicate(&fingerprint)),
            Err(err) => Err(ServiceError::Sqlx(err)),
        }
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("question", id));
        }
        Ok(())
    }
}

fn duplicate(fingerprint: &str) -> ServiceError {
    ServiceError::Conflict(format!(
        "a question with the same statement already exists (fingerprint {})",
        fingerprint
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_ignores_case_and_spacing() {
        assert_eq!(
            fingerprint("Qual é a  capital\n do Brasil?"),
            fingerprint("qual é a capital do brasil?")
        );
        assert_ne!(fingerprint("2 + 2"), fingerprint("2 + 3"));
    }
}
