//! edu-platform: lessons, question bank, TRI-scored exams, flashcards and
//! study schedules behind a JSON API.

use sqlx::SqlitePool;
use std::sync::Arc;

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod tri;

use services::{
    content_service::ContentService, exam_service::ExamService,
    flashcard_service::FlashcardService, question_service::QuestionService,
    schedule_service::ScheduleService,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub content: ContentService,
    pub questions: QuestionService,
    pub exams: ExamService,
    pub flashcards: FlashcardService,
    pub schedules: ScheduleService,
}

impl AppState {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self {
            content: ContentService::new(db.clone()),
            questions: QuestionService::new(db.clone()),
            exams: ExamService::new(db.clone()),
            flashcards: FlashcardService::new(db.clone()),
            schedules: ScheduleService::new(db.clone()),
            db,
        }
    }
}

pub use routes::routes::build_router;
