//! Core data models for the thumbnail service.
//!
//! Stored objects and thumbnail records map to SQLite tables via
//! `sqlx::FromRow` and serialize as JSON via `serde`. Upload notifications
//! are the typed form of incoming trigger events.

pub mod event;
pub mod object;
pub mod thumbnail;
