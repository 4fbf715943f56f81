//! HTTP handlers. Each one extracts its inputs, delegates to a service in
//! `AppState` and maps the outcome onto a JSON response.

pub mod content_handlers;
pub mod exam_handlers;
pub mod flashcard_handlers;
pub mod health_handlers;
pub mod question_handlers;
pub mod schedule_handlers;
