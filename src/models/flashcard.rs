//! Flashcard decks and cards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct FlashcardDeck {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub lesson_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A two-sided card with its review tally.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Flashcard {
    pub id: Uuid,

    pub deck_id: Uuid,

    /// Prompt side.
    pub front: String,

    /// Answer side.
    pub back: String,

    pub position: i64,

    pub review_count: i64,

    /// Reviews the learner marked as remembered.
    pub correct_count: i64,

    pub last_reviewed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeckInput {
    pub title: String,
    pub description: Option<String>,
    pub lesson_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardInput {
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub correct: bool,
}
