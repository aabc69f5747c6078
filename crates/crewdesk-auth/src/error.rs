//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialsInvalid,

    #[error("Authorization token missing")]
    TokenMissing,

    #[error("Token malformed or missing required claims")]
    TokenMalformed,

    #[error("Session expired")]
    TokenExpired,

    #[error("Invalid token signature")]
    TokenSignatureInvalid,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Account no longer exists")]
    AccountNotFound,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token signing error: {0}")]
    Signing(String),
}

impl AuthError {
    /// Stable machine-readable code carried in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::CredentialsInvalid => "INVALID_CREDENTIALS",
            AuthError::TokenMissing => "TOKEN_MISSING",
            AuthError::TokenMalformed => "TOKEN_MALFORMED",
            AuthError::TokenExpired => "SESSION_EXPIRED",
            AuthError::TokenSignatureInvalid => "INVALID_TOKEN",
            AuthError::AccountInactive => "ACCOUNT_INACTIVE",
            AuthError::AccountNotFound => "ACCOUNT_NOT_FOUND",
            AuthError::PasswordHash(_) | AuthError::Signing(_) => "AUTH_INTERNAL",
        }
    }

    /// Whether the session gate should clear the cookie on this failure.
    ///
    /// A poisoned cookie must be removed before redirecting, otherwise the
    /// client loops between login and the protected page forever.
    pub fn clears_cookie(&self) -> bool {
        matches!(
            self,
            AuthError::TokenMalformed | AuthError::TokenExpired | AuthError::TokenSignatureInvalid
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::AccountInactive => StatusCode::FORBIDDEN,
            AuthError::PasswordHash(_) | AuthError::Signing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Internal variants carry hashing/signing detail that must not reach
        // the client.
        let message = match &self {
            AuthError::PasswordHash(_) | AuthError::Signing(_) => "Internal error".to_string(),
            other => other.to_string(),
        };

        let body = axum::Json(json!({
            "error": self.code(),
            "message": message,
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::CredentialsInvalid.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::TokenExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::AccountInactive.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::PasswordHash("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_cookie_clearing_failures() {
        assert!(AuthError::TokenExpired.clears_cookie());
        assert!(AuthError::TokenSignatureInvalid.clears_cookie());
        assert!(AuthError::TokenMalformed.clears_cookie());
        assert!(!AuthError::TokenMissing.clears_cookie());
        assert!(!AuthError::CredentialsInvalid.clears_cookie());
    }

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            AuthError::CredentialsInvalid.code(),
            AuthError::TokenMissing.code(),
            AuthError::TokenMalformed.code(),
            AuthError::TokenExpired.code(),
            AuthError::TokenSignatureInvalid.code(),
            AuthError::AccountInactive.code(),
            AuthError::AccountNotFound.code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
