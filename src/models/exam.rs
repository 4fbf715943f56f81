//! Exams, their ordered questions and scored submissions.

use super::question::Question;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Exam {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Suggested duration; not enforced server-side.
    pub time_limit_minutes: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// An exam together with its questions in exam order.
#[derive(Serialize, Debug)]
pub struct ExamDetail {
    #[serde(flatten)]
    pub exam: Exam,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExamInput {
    pub title: String,
    pub description: Option<String>,
    pub time_limit_minutes: Option<u32>,
}

/// Replacement question list for an exam.
#[derive(Debug, Clone, Deserialize)]
pub struct ExamQuestionsInput {
    pub question_ids: Vec<Uuid>,
}

/// One answer as sent by the candidate. `None` means left blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerInput {
    pub question_id: Uuid,
    pub selected_index: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionInput {
    pub user_id: String,
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}

/// How a single question was answered, as stored with the submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: Uuid,
    pub selected_index: Option<u32>,
    pub correct: bool,
}

/// A scored attempt at an exam.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Submission {
    pub id: Uuid,

    pub exam_id: Uuid,

    pub user_id: String,

    /// One record per exam question, in exam order.
    #[sqlx(json)]
    pub answers: Vec<AnswerRecord>,

    pub correct_count: u32,

    pub total_questions: u32,

    /// Estimated ability on the logit scale.
    pub theta: f64,

    pub standard_error: Option<f64>,

    /// Ability on the 0-1000 display scale.
    pub score: f64,

    pub iterations: u32,

    pub submitted_at: DateTime<Utc>,
}
