//! Defines routes for the learning platform API.
//!
//! ## Structure
//! - **Content tree** (`{kind}` is `sectors`, `topics`, `subtopics`,
//!   `modules`, `submodules` or `lessons`)
//!   - `GET|POST        /api/content/{kind}`
//!   - `GET|PUT|DELETE  /api/content/{kind}/{id}`
//!   - `GET             /api/content/{kind}/{id}/children`
//!   - `GET             /api/content/{kind}/{id}/path`
//!   - `POST            /api/content/{kind}/reorder`
//!
//! - **Question bank**
//!   - `GET|POST        /api/questions`
//!   - `GET|PUT|DELETE  /api/questions/{id}`
//!
//! - **Exams**
//!   - `GET|POST        /api/exams`
//!   - `GET|PUT|DELETE  /api/exams/{id}`
//!   - `PUT             /api/exams/{id}/questions`
//!   - `GET|POST        /api/exams/{id}/submissions`
//!   - `GET             /api/submissions/{id}`
//!   - `GET             /api/users/{user_id}/submissions`
//!
//! - **Flashcards**
//!   - `GET|POST        /api/decks`
//!   - `GET|PUT|DELETE  /api/decks/{id}`
//!   - `GET|POST        /api/decks/{id}/cards`
//!   - `PUT|DELETE      /api/cards/{id}`
//!   - `POST            /api/cards/{id}/review`
//!
//! - **Schedules**
//!   - `GET|POST        /api/schedules`
//!   - `GET|PUT|DELETE  /api/schedules/{id}`
//!   - `POST            /api/schedules/{id}/complete`

use crate::{
    AppState,
    handlers::{
        content_handlers::{
            create_node, delete_node, get_node, list_nodes, node_children, node_path,
            reorder_nodes, update_node,
        },
        exam_handlers::{
            create_exam, delete_exam, get_exam, get_submission, list_exam_submissions,
            list_exams, set_exam_questions, submit_exam, update_exam, user_submissions,
        },
        flashcard_handlers::{
            create_card, create_deck, delete_card, delete_deck, get_deck, list_cards,
            list_decks, review_card, update_card, update_deck,
        },
        health_handlers::{healthz, readyz},
        question_handlers::{
            create_question, delete_question, get_question, list_questions, update_question,
        },
        schedule_handlers::{
            complete_schedule, create_schedule, delete_schedule, get_schedule, list_schedules,
            update_schedule,
        },
    },
};
use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

/// Build the router for every API route.
///
/// The router carries shared state (`AppState`) to all handlers and wraps
/// each request in a tracing span.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Content tree
        .route("/api/content/{kind}", get(list_nodes).post(create_node))
        .route("/api/content/{kind}/reorder", post(reorder_nodes))
        .route(
            "/api/content/{kind}/{id}",
            get(get_node).put(update_node).delete(delete_node),
        )
        .route("/api/content/{kind}/{id}/children", get(node_children))
        .route("/api/content/{kind}/{id}/path", get(node_path))
        // Question bank
        .route("/api/questions", get(list_questions).post(create_question))
        .route(
            "/api/questions/{id}",
            get(get_question).put(update_question).delete(delete_question),
        )
        // Exams
        .route("/api/exams", get(list_exams).post(create_exam))
        .route(
            "/api/exams/{id}",
            get(get_exam).put(update_exam).delete(delete_exam),
        )
        .route("/api/exams/{id}/questions", put(set_exam_questions))
        .route(
            "/api/exams/{id}/submissions",
            get(list_exam_submissions).post(submit_exam),
        )
        .route("/api/submissions/{id}", get(get_submission))
        .route("/api/users/{user_id}/submissions", get(user_submissions))
        // Flashcards
        .route("/api/decks", get(list_decks).post(create_deck))
        .route(
            "/api/decks/{id}",
            get(get_deck).put(update_deck).delete(delete_deck),
        )
        .route("/api/decks/{id}/cards", get(list_cards).post(create_card))
        .route("/api/cards/{id}", put(update_card).delete(delete_card))
        .route("/api/cards/{id}/review", post(review_card))
        // Schedules
        .route("/api/schedules", get(list_schedules).post(create_schedule))
        .route(
            "/api/schedules/{id}",
            get(get_schedule).put(update_schedule).delete(delete_schedule),
        )
        .route("/api/schedules/{id}/complete", post(complete_schedule))
        .layer(TraceLayer::new_for_http())
}

/// Attach state to [`routes`], producing a service ready for `axum::serve`.
pub fn build_router(state: AppState) -> Router {
    routes().with_state(state)
}
