//! Handlers for flashcard decks and cards.

use crate::{
    AppState,
    errors::AppError,
    models::flashcard::{CardInput, DeckInput, Flashcard, FlashcardDeck, ReviewInput},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListDecksQuery {
    pub lesson_id: Option<Uuid>,
}

/// GET `/api/decks`: `?lesson_id=` narrows to one lesson.
pub async fn list_decks(
    State(state): State<AppState>,
    Query(q): Query<ListDecksQuery>,
) -> Result<Json<Vec<FlashcardDeck>>, AppError> {
    Ok(Json(state.flashcards.list_decks(q.lesson_id).await?))
}

/// POST `/api/decks`
pub async fn create_deck(
    State(state): State<AppState>,
    Json(input): Json<DeckInput>,
) -> Result<impl IntoResponse, AppError> {
    let deck = state.flashcards.create_deck(input).await?;
    Ok((StatusCode::CREATED, Json(deck)))
}

/// GET `/api/decks/{id}`
pub async fn get_deck(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FlashcardDeck>, AppError> {
    Ok(Json(state.flashcards.get_deck(id).await?))
}

/// PUT `/api/decks/{id}`
pub async fn update_deck(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<DeckInput>,
) -> Result<Json<FlashcardDeck>, AppError> {
    Ok(Json(state.flashcards.update_deck(id, input).await?))
}

/// DELETE `/api/decks/{id}`
pub async fn delete_deck(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.flashcards.delete_deck(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/api/decks/{id}/cards`
pub async fn list_cards(
    State(state): State<AppState>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<Vec<Flashcard>>, AppError> {
    Ok(Json(state.flashcards.list_cards(deck_id).await?))
}

/// POST `/api/decks/{id}/cards`
pub async fn create_card(
    State(state): State<AppState>,
    Path(deck_id): Path<Uuid>,
    Json(input): Json<CardInput>,
) -> Result<impl IntoResponse, AppError> {
    let card = state.flashcards.create_card(deck_id, input).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// PUT `/api/cards/{id}`
pub async fn update_card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CardInput>,
) -> Result<Json<Flashcard>, AppError> {
    Ok(Json(state.flashcards.update_card(id, input).await?))
}

/// DELETE `/api/cards/{id}`
pub async fn delete_card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.flashcards.delete_card(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/api/cards/{id}/review`
pub async fn review_card(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ReviewInput>,
) -> Result<Json<Flashcard>, AppError> {
    Ok(Json(state.flashcards.review(id, input.correct).await?))
}
