//! Crewdesk Authentication and Authorization
//!
//! This crate provides the session-auth core for the Crewdesk HR portal:
//! password hashing, signed session tokens, the cookie contract, and the
//! request-gating middleware that enforces authentication on every route.

pub mod cookie;
pub mod error;
pub mod flight;
pub mod gate;
pub mod password;
pub mod token;

pub use cookie::{CookieOptions, SESSION_COOKIE, build_clear_cookie, build_session_cookie, session_token};
pub use error::AuthError;
pub use flight::SingleFlight;
pub use gate::{AuthUser, PathPolicy, SessionGate, session_gate};
pub use password::{generate_salt, hash_password, verify_password};
pub use token::{Claims, TokenCodec};
