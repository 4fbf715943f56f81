//! Core data models for the learning platform.
//!
//! These are plain records that map to SQLite tables via `sqlx::FromRow` and
//! serialize as JSON via `serde`. Request payloads live next to the record
//! they create.

pub mod content;
pub mod exam;
pub mod flashcard;
pub mod question;
pub mod schedule;
