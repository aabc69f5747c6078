//! Crewdesk Database Layer
//!
//! This crate provides the persistence layer for the Crewdesk HR portal,
//! using SQLite via sqlx: employee credential records and leave requests.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
