//! Crewdesk REST API
//!
//! This crate provides the Axum-based HTTP API for the Crewdesk HR portal:
//! session authentication endpoints, the employee directory, and the leave
//! workflow, all behind the session gate.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
