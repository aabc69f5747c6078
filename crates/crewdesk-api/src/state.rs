//! Application state

use crewdesk_auth::{CookieOptions, SingleFlight, TokenCodec};
use crewdesk_db::Database;
use std::sync::Arc;

/// Outcome of re-checking an account's current status against the store.
///
/// `Unavailable` carries the underlying error text; it is only surfaced to
/// clients in dev mode, otherwise the caller fails closed with a generic
/// verification failure.
#[derive(Debug, Clone)]
pub enum AccountCheck {
    Active,
    Inactive,
    NotFound,
    Unavailable(String),
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub codec: Arc<TokenCodec>,
    pub cookies: CookieOptions,
    /// Deduplicates concurrent status rechecks per employee.
    pub status_checks: Arc<SingleFlight<i64, AccountCheck>>,
    /// Shared secret required to self-register; None disables registration.
    pub register_secret: Option<String>,
    /// Include failure detail strings in responses (local development only).
    pub dev_mode: bool,
}

impl AppState {
    pub fn new(
        db: Database,
        codec: Arc<TokenCodec>,
        cookies: CookieOptions,
        register_secret: Option<String>,
        dev_mode: bool,
    ) -> Self {
        Self {
            db,
            codec,
            cookies,
            status_checks: Arc::new(SingleFlight::new()),
            register_secret,
            dev_mode,
        }
    }
}
