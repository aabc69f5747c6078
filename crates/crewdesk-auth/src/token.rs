//! Session token codec
//!
//! Tokens are HMAC-SHA256 signed JWTs carrying the full identity needed to
//! render a user without a database round-trip. Verification distinguishes
//! four failures (missing, malformed, expired, bad signature) so callers can
//! branch on outcome instead of catching a single opaque error.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// Clock-skew tolerance applied to expiry checks, in seconds.
pub const EXPIRY_LEEWAY_SECS: i64 = 15;

/// Default session lifetime in hours.
pub const DEFAULT_TTL_HOURS: i64 = 8;

/// Verified session claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (employee ID)
    pub sub: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Role/position string
    pub role: String,
    /// Account status at issuance
    pub status: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Claims as decoded from the wire, before presence validation.
///
/// Every field is optional here; a token that deserializes but lacks any of
/// the identity claims is malformed, which is a different failure than a bad
/// signature or an expired session.
#[derive(Deserialize)]
struct RawClaims {
    sub: Option<String>,
    name: Option<String>,
    email: Option<String>,
    role: Option<String>,
    status: Option<String>,
    iat: Option<i64>,
    exp: Option<i64>,
}

/// Token codec for session issuance and verification
///
/// Holds the process-wide signing secret, loaded once at startup. The binary
/// refuses to start without a secret, so construction is infallible here.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Session lifetime in seconds, for cookie Max-Age.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a signed token for a verified identity.
    pub fn issue(
        &self,
        employee_id: i64,
        name: &str,
        email: &str,
        role: &str,
        status: &str,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: employee_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            status: status.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        debug!("Issuing session token for employee {}", employee_id);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify a token: signature, then claim presence, then expiry.
    ///
    /// The order matters: a validly-signed token missing a claim is reported
    /// as malformed even if it is also past its expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked manually below so that claim-presence failures
        // take precedence and the leeway is explicit.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<RawClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => AuthError::TokenSignatureInvalid,
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_)
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName => AuthError::TokenMalformed,
                // Fail closed on anything unexpected.
                _ => AuthError::TokenSignatureInvalid,
            }
        })?;

        let raw = data.claims;
        let (Some(sub), Some(name), Some(email), Some(role), Some(status), Some(iat), Some(exp)) = (
            raw.sub, raw.name, raw.email, raw.role, raw.status, raw.iat, raw.exp,
        ) else {
            return Err(AuthError::TokenMalformed);
        };

        let now = Utc::now().timestamp();
        if exp + EXPIRY_LEEWAY_SECS <= now {
            return Err(AuthError::TokenExpired);
        }

        Ok(Claims {
            sub,
            name,
            email,
            role,
            status,
            iat,
            exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "test-secret-key";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET, DEFAULT_TTL_HOURS)
    }

    /// Sign an arbitrary claim set with the test secret, bypassing `issue`.
    fn sign_raw(claims: &serde_json::Value) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_roundtrip() {
        let codec = codec();
        let token = codec.issue(42, "Jane Doe", "jane@crewdesk.test", "Manager", "A").unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.name, "Jane Doe");
        assert_eq!(claims.email, "jane@crewdesk.test");
        assert_eq!(claims.role, "Manager");
        assert_eq!(claims.status, "A");
        assert_eq!(claims.exp - claims.iat, DEFAULT_TTL_HOURS * 3600);
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(codec().verify("not-a-token"), Err(AuthError::TokenMalformed));
    }

    #[test]
    fn test_tampered_payload_is_signature_invalid() {
        let codec = codec();
        let token = codec.issue(42, "Jane", "j@x.test", "Staff", "A").unwrap();

        // Flip a byte in the payload segment; the signature no longer matches.
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let mut payload = parts[1].clone().into_bytes();
        payload[0] = if payload[0] == b'A' { b'B' } else { b'A' };
        parts[1] = String::from_utf8(payload).unwrap();
        let tampered = parts.join(".");

        assert_eq!(codec.verify(&tampered), Err(AuthError::TokenSignatureInvalid));
    }

    #[test]
    fn test_wrong_secret_is_signature_invalid() {
        let token = codec().issue(1, "a", "a@x.test", "Staff", "A").unwrap();
        let other = TokenCodec::new("a-different-secret", DEFAULT_TTL_HOURS);
        assert_eq!(other.verify(&token), Err(AuthError::TokenSignatureInvalid));
    }

    #[test]
    fn test_missing_claim_is_malformed() {
        let now = Utc::now().timestamp();
        // Validly signed, but no email claim.
        let token = sign_raw(&json!({
            "sub": "42",
            "name": "Jane",
            "role": "Staff",
            "status": "A",
            "iat": now,
            "exp": now + 3600,
        }));
        assert_eq!(codec().verify(&token), Err(AuthError::TokenMalformed));
    }

    #[test]
    fn test_missing_claim_wins_over_expiry() {
        let now = Utc::now().timestamp();
        let token = sign_raw(&json!({
            "sub": "42",
            "name": "Jane",
            "role": "Staff",
            "status": "A",
            "iat": now - 7200,
            "exp": now - 3600,
        }));
        assert_eq!(codec().verify(&token), Err(AuthError::TokenMalformed));
    }

    #[test]
    fn test_expired_token() {
        let now = Utc::now().timestamp();
        let token = sign_raw(&json!({
            "sub": "42",
            "name": "Jane",
            "email": "j@x.test",
            "role": "Staff",
            "status": "A",
            "iat": now - 7200,
            "exp": now - EXPIRY_LEEWAY_SECS - 5,
        }));
        assert_eq!(codec().verify(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_expiry_within_leeway_accepted() {
        let now = Utc::now().timestamp();
        let token = sign_raw(&json!({
            "sub": "42",
            "name": "Jane",
            "email": "j@x.test",
            "role": "Staff",
            "status": "A",
            "iat": now - 3600,
            "exp": now - 5,
        }));
        assert!(codec().verify(&token).is_ok());
    }
}
