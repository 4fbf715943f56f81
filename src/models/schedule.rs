//! Study schedule entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A block of study time a user planned, optionally tied to a lesson or exam.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Schedule {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub notes: Option<String>,
    pub lesson_id: Option<Uuid>,
    pub exam_id: Option<Uuid>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleInput {
    pub user_id: String,
    pub title: String,
    pub notes: Option<String>,
    pub lesson_id: Option<Uuid>,
    pub exam_id: Option<Uuid>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Query filters for listing schedules. The window keeps entries that
/// overlap `[from, to)`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleFilter {
    pub user_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}
