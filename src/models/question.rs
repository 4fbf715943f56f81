//! Multiple-choice questions with their 3PL item parameters.

use crate::tri::ItemParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Default discrimination for items that have not been calibrated.
pub const DEFAULT_DISCRIMINATION: f64 = 1.0;
/// Default difficulty for items that have not been calibrated.
pub const DEFAULT_DIFFICULTY: f64 = 0.0;
/// Default guessing floor, one in five alternatives.
pub const DEFAULT_GUESSING: f64 = 0.2;

/// A question in the bank.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Question {
    pub id: Uuid,

    pub statement: String,

    /// Answer options in display order.
    #[sqlx(json)]
    pub alternatives: Vec<String>,

    /// Index into `alternatives` of the right answer.
    pub correct_index: u32,

    pub subject: Option<String>,

    pub explanation: Option<String>,

    /// Lesson this question practices, if any.
    pub lesson_id: Option<Uuid>,

    pub discrimination: f64,

    pub difficulty: f64,

    pub guessing: f64,

    /// md5 of the normalized statement, used to reject duplicates.
    pub fingerprint: String,

    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn item_params(&self) -> ItemParams {
        ItemParams::new(self.discrimination, self.difficulty, self.guessing)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionInput {
    pub statement: String,
    pub alternatives: Vec<String>,
    pub correct_index: u32,
    pub subject: Option<String>,
    pub explanation: Option<String>,
    pub lesson_id: Option<Uuid>,
    pub discrimination: Option<f64>,
    pub difficulty: Option<f64>,
    pub guessing: Option<f64>,
}

impl QuestionInput {
    /// Item parameters with defaults filled in.
    pub fn item_params(&self) -> ItemParams {
        ItemParams::new(
            self.discrimination.unwrap_or(DEFAULT_DISCRIMINATION),
            self.difficulty.unwrap_or(DEFAULT_DIFFICULTY),
            self.guessing.unwrap_or(DEFAULT_GUESSING),
        )
    }
}
