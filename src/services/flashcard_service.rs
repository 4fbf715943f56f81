//! FlashcardService: decks, cards and review tallies.

use super::{
    ServiceError, ServiceResult, content_service::ensure_lesson_exists, optional_text,
    required_text, row_or_not_found,
};
use crate::models::flashcard::{CardInput, DeckInput, Flashcard, FlashcardDeck};
use chrono::Utc;
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const MAX_TITLE_LEN: usize = 200;
const MAX_SIDE_LEN: usize = 4_000;
const DECK_COLUMNS: &str = "id, title, description, lesson_id, created_at";
const CARD_COLUMNS: &str = "id, deck_id, front, back, position, review_count, correct_count, \
                            last_reviewed_at, created_at";

#[derive(Clone)]
pub struct FlashcardService {
    pub db: Arc<SqlitePool>,
}

impl FlashcardService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    async fn normalize_deck(&self, input: &DeckInput) -> ServiceResult<DeckInput> {
        let title = required_text("title", &input.title, MAX_TITLE_LEN)?;
        if let Some(lesson_id) = input.lesson_id {
            ensure_lesson_exists(&self.db, lesson_id).await?;
        }
        Ok(DeckInput {
            title,
            description: optional_text(input.description.as_deref()),
            lesson_id: input.lesson_id,
        })
    }

    fn normalize_card(input: &CardInput) -> ServiceResult<CardInput> {
        Ok(CardInput {
            front: required_text("front", &input.front, MAX_SIDE_LEN)?,
            back: required_text("back", &input.back, MAX_SIDE_LEN)?,
        })
    }

    pub async fn get_deck(&self, id: Uuid) -> ServiceResult<FlashcardDeck> {
        sqlx::query_as::<_, FlashcardDeck>(&format!(
            "SELECT {} FROM flashcard_decks WHERE id = ?",
            DECK_COLUMNS
        ))
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(row_or_not_found("deck", id))
    }

    /// All decks, or only those attached to one lesson.
    pub async fn list_decks(&self, lesson_id: Option<Uuid>) -> ServiceResult<Vec<FlashcardDeck>> {
        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM flashcard_decks", DECK_COLUMNS));
        if let Some(lesson_id) = lesson_id {
            builder.push(" WHERE lesson_id = ");
            builder.push_bind(lesson_id);
        }
        builder.push(" ORDER BY title ASC");

        let decks: Vec<FlashcardDeck> = builder.build_query_as().fetch_all(&*self.db).await?;
        Ok(decks)
    }

    pub async fn create_deck(&self, input: DeckInput) -> ServiceResult<FlashcardDeck> {
        let input = self.normalize_deck(&input).await?;
        let deck = sqlx::query_as::<_, FlashcardDeck>(&format!(
            "INSERT INTO flashcard_decks ({}) VALUES (?, ?, ?, ?, ?) RETURNING {}",
            DECK_COLUMNS, DECK_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.lesson_id)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await?;

        info!(id = %deck.id, "created flashcard deck");
        Ok(deck)
    }

    pub async fn update_deck(&self, id: Uuid, input: DeckInput) -> ServiceResult<FlashcardDeck> {
        let input = self.normalize_deck(&input).await?;
        sqlx::query_as::<_, FlashcardDeck>(&format!(
            "UPDATE flashcard_decks SET title = ?, description = ?, lesson_id = ?
             WHERE id = ? RETURNING {}",
            DECK_COLUMNS
        ))
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.lesson_id)
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(row_or_not_found("deck", id))
    }

    /// Delete a deck and every card in it.
    pub async fn delete_deck(&self, id: Uuid) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM flashcard_decks WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("deck", id));
        }
        Ok(())
    }

    pub async fn list_cards(&self, deck_id: Uuid) -> ServiceResult<Vec<Flashcard>> {
        self.get_deck(deck_id).await?;
        let cards = sqlx::query_as::<_, Flashcard>(&format!(
            "SELECT {} FROM flashcards WHERE deck_id = ? ORDER BY position ASC",
            CARD_COLUMNS
        ))
        .bind(deck_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(cards)
    }

    /// Append a card to the end of a deck.
    pub async fn create_card(&self, deck_id: Uuid, input: CardInput) -> ServiceResult<Flashcard> {
        let input = Self::normalize_card(&input)?;
        self.get_deck(deck_id).await?;

        let position = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM flashcards WHERE deck_id = ?",
        )
        .bind(deck_id)
        .fetch_one(&*self.db)
        .await?;

        let card = sqlx::query_as::<_, Flashcard>(&format!(
            "INSERT INTO flashcards ({}) VALUES (?, ?, ?, ?, ?, 0, 0, NULL, ?) RETURNING {}",
            CARD_COLUMNS, CARD_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(deck_id)
        .bind(&input.front)
        .bind(&input.back)
        .bind(position)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await?;

        debug!(deck = %deck_id, card = %card.id, "added flashcard");
        Ok(card)
    }

    pub async fn update_card(&self, id: Uuid, input: CardInput) -> ServiceResult<Flashcard> {
        let input = Self::normalize_card(&input)?;
        sqlx::query_as::<_, Flashcard>(&format!(
            "UPDATE flashcards SET front = ?, back = ? WHERE id = ? RETURNING {}",
            CARD_COLUMNS
        ))
        .bind(&input.front)
        .bind(&input.back)
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(row_or_not_found("flashcard", id))
    }

    pub async fn delete_card(&self, id: Uuid) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM flashcards WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("flashcard", id));
        }
        Ok(())
    }

    /// Record one review of a card.
    pub async fn review(&self, id: Uuid, correct: bool) -> ServiceResult<Flashcard> {
        sqlx::query_as::<_, Flashcard>(&format!(
            "UPDATE flashcards
             SET review_count = review_count + 1,
                 correct_count = correct_count + ?,
                 last_reviewed_at = ?
             WHERE id = ?
             RETURNING {}",
            CARD_COLUMNS
        ))
        .bind(i64::from(correct))
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(row_or_not_found("flashcard", id))
    }
}
