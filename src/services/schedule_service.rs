//! ScheduleService: planned study sessions.

use super::{
    ServiceError, ServiceResult, content_service::ensure_lesson_exists, ensure_exam_exists,
    optional_text, required_text, row_or_not_found,
};
use crate::models::schedule::{Schedule, ScheduleFilter, ScheduleInput};
use chrono::Utc;
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const MAX_TITLE_LEN: usize = 200;
const MAX_USER_ID_LEN: usize = 128;
const SCHEDULE_COLUMNS: &str = "id, user_id, title, notes, lesson_id, exam_id, starts_at, \
                                ends_at, completed, created_at";

#[derive(Clone)]
pub struct ScheduleService {
    pub db: Arc<SqlitePool>,
}

impl ScheduleService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    async fn normalize(&self, input: &ScheduleInput) -> ServiceResult<ScheduleInput> {
        let user_id = required_text("user_id", &input.user_id, MAX_USER_ID_LEN)?;
        let title = required_text("title", &input.title, MAX_TITLE_LEN)?;
        if input.ends_at <= input.starts_at {
            return Err(ServiceError::validation("ends_at must be after starts_at"));
        }
        if let Some(lesson_id) = input.lesson_id {
            ensure_lesson_exists(&self.db, lesson_id).await?;
        }
        if let Some(exam_id) = input.exam_id {
            ensure_exam_exists(&self.db, exam_id).await?;
        }
        Ok(ScheduleInput {
            user_id,
            title,
            notes: optional_text(input.notes.as_deref()),
            lesson_id: input.lesson_id,
            exam_id: input.exam_id,
            starts_at: input.starts_at,
            ends_at: input.ends_at,
        })
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Schedule> {
        sqlx::query_as::<_, Schedule>(&format!(
            "SELECT {} FROM schedules WHERE id = ?",
            SCHEDULE_COLUMNS
        ))
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(row_or_not_found("schedule", id))
    }

    /// Schedules ordered by start time. `from`/`to` keep entries that overlap
    /// the window.
    pub async fn list(&self, filter: ScheduleFilter) -> ServiceResult<Vec<Schedule>> {
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if to <= from {
                return Err(ServiceError::validation("`to` must be after `from`"));
            }
        }

        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM schedules WHERE 1 = 1",
            SCHEDULE_COLUMNS
        ));
        if let Some(user_id) = filter.user_id {
            builder.push(" AND user_id = ");
            builder.push_bind(user_id);
        }
        if let Some(to) = filter.to {
            builder.push(" AND starts_at < ");
            builder.push_bind(to);
        }
        if let Some(from) = filter.from {
            builder.push(" AND ends_at > ");
            builder.push_bind(from);
        }
        builder.push(" ORDER BY starts_at ASC");

        let schedules: Vec<Schedule> = builder.build_query_as().fetch_all(&*self.db).await?;
        Ok(schedules)
    }

    pub async fn create(&self, input: ScheduleInput) -> ServiceResult<Schedule> {
        let input = self.normalize(&input).await?;
        let schedule = sqlx::query_as::<_, Schedule>(&format!(
            "INSERT INTO schedules ({})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
             RETURNING {}",
            SCHEDULE_COLUMNS, SCHEDULE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.user_id)
        .bind(&input.title)
        .bind(&input.notes)
        .bind(input.lesson_id)
        .bind(input.exam_id)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await?;

        info!(id = %schedule.id, user = %schedule.user_id, "created schedule");
        Ok(schedule)
    }

    /// Replace a schedule's fields, keeping its completion flag.
    pub async fn update(&self, id: Uuid, input: ScheduleInput) -> ServiceResult<Schedule> {
        let input = self.normalize(&input).await?;
        sqlx::query_as::<_, Schedule>(&format!(
            "UPDATE schedules
             SET user_id = ?, title = ?, notes = ?, lesson_id = ?, exam_id = ?,
                 starts_at = ?, ends_at = ?
             WHERE id = ?
             RETURNING {}",
            SCHEDULE_COLUMNS
        ))
        .bind(&input.user_id)
        .bind(&input.title)
        .bind(&input.notes)
        .bind(input.lesson_id)
        .bind(input.exam_id)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(row_or_not_found("schedule", id))
    }

    pub async fn complete(&self, id: Uuid) -> ServiceResult<Schedule> {
        sqlx::query_as::<_, Schedule>(&format!(
            "UPDATE schedules SET completed = 1 WHERE id = ? RETURNING {}",
            SCHEDULE_COLUMNS
        ))
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(row_or_not_found("schedule", id))
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("schedule", id));
        }
        Ok(())
    }
}
