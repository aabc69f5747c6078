//! Session gate middleware for Axum
//!
//! Runs on every request: public paths pass through, everything else needs a
//! valid session cookie. Invalid cookies are cleared before redirecting so a
//! poisoned token cannot cause a redirect loop. Any verification failure is
//! treated as unauthenticated (fail closed).

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cookie::{CookieOptions, build_clear_cookie, session_token};
use crate::error::AuthError;
use crate::token::{Claims, TokenCodec};

/// Authenticated user information, inserted into request extensions for
/// downstream handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
}

impl AuthUser {
    /// Build from verified claims. A subject that does not parse as an
    /// employee ID means the token body is malformed.
    pub fn from_claims(claims: &Claims) -> Result<Self, AuthError> {
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::TokenMalformed)?;
        Ok(Self {
            id,
            name: claims.name.clone(),
            email: claims.email.clone(),
            role: claims.role.clone(),
            status: claims.status.clone(),
        })
    }
}

/// Request path classification, immutable after startup.
#[derive(Debug, Clone)]
pub struct PathPolicy {
    /// Exact paths that bypass the gate entirely.
    public_paths: HashSet<String>,
    /// Paths whose responses must never be cached anywhere.
    never_cache: HashSet<String>,
    /// Prefixes for static assets, served without auth.
    static_prefixes: Vec<String>,
    /// Page prefixes that authenticated users are bounced away from.
    auth_page_prefixes: Vec<String>,
    pub login_path: String,
    pub dashboard_path: String,
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self {
            public_paths: [
                "/login",
                "/register",
                "/api/auth/login",
                "/api/auth/register",
                "/api/auth/verify",
                "/api/auth/logout",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            never_cache: ["/api/auth/logout"].into_iter().map(String::from).collect(),
            static_prefixes: vec!["/static/".to_string(), "/assets/".to_string()],
            auth_page_prefixes: vec!["/login".to_string(), "/register".to_string()],
            login_path: "/login".to_string(),
            dashboard_path: "/dashboard".to_string(),
        }
    }
}

impl PathPolicy {
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.contains(path)
    }

    pub fn is_static_asset(&self, path: &str) -> bool {
        self.static_prefixes.iter().any(|p| path.starts_with(p))
    }

    pub fn is_never_cache(&self, path: &str) -> bool {
        self.never_cache.contains(path)
    }

    pub fn is_auth_page(&self, path: &str) -> bool {
        self.auth_page_prefixes.iter().any(|p| path.starts_with(p))
    }
}

/// Shared gate state: token codec, path classification, cookie attributes.
pub struct SessionGate {
    pub codec: Arc<TokenCodec>,
    pub policy: PathPolicy,
    pub cookies: CookieOptions,
}

impl SessionGate {
    pub fn new(codec: Arc<TokenCodec>, policy: PathPolicy, cookies: CookieOptions) -> Self {
        Self {
            codec,
            policy,
            cookies,
        }
    }

    /// Redirect to the login page, preserving the requested path for the
    /// post-login return. Optionally clears the session cookie first.
    fn login_redirect(&self, from: &str, clear_cookie: bool) -> Response {
        let encoded: String = url::form_urlencoded::byte_serialize(from.as_bytes()).collect();
        let location = format!("{}?from={}", self.policy.login_path, encoded);

        let mut builder = Response::builder()
            .status(StatusCode::TEMPORARY_REDIRECT)
            .header(header::LOCATION, location);
        if clear_cookie {
            builder = builder.header(header::SET_COOKIE, build_clear_cookie(self.cookies));
        }
        builder
            .body(Body::empty())
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }

    fn dashboard_redirect(&self) -> Response {
        Response::builder()
            .status(StatusCode::TEMPORARY_REDIRECT)
            .header(header::LOCATION, self.policy.dashboard_path.clone())
            .body(Body::empty())
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}

/// Session gate middleware
///
/// Ordering per request: static/public bypass, cookie extraction, token
/// verification (clear + redirect on failure), redirect unauthenticated,
/// bounce authenticated users off auth pages, then forward with caching
/// disabled on the response.
pub async fn session_gate(
    State(gate): State<Arc<SessionGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if gate.policy.is_static_asset(&path) {
        return next.run(request).await;
    }

    if gate.policy.is_public(&path) {
        // A signed-in user has no business on the auth pages themselves;
        // bounce before the bypass so /login never renders for them.
        if gate.policy.is_auth_page(&path)
            && let Some(token) = session_token(request.headers())
            && gate.codec.verify(&token).is_ok()
        {
            return gate.dashboard_redirect();
        }
        let mut response = next.run(request).await;
        if gate.policy.is_never_cache(&path) {
            let headers = response.headers_mut();
            headers.insert(header::CACHE_CONTROL, header::HeaderValue::from_static("no-store"));
            headers.insert(header::PRAGMA, header::HeaderValue::from_static("no-cache"));
        }
        return response;
    }

    let user = match session_token(request.headers()) {
        Some(token) => {
            match gate
                .codec
                .verify(&token)
                .and_then(|claims| AuthUser::from_claims(&claims))
            {
                Ok(user) => user,
                Err(err) => {
                    debug!("Session rejected on {}: {}", path, err);
                    return gate.login_redirect(&path, err.clears_cookie());
                }
            }
        }
        None => return gate.login_redirect(&path, false),
    };

    if gate.policy.is_auth_page(&path) {
        return gate.dashboard_redirect();
    }

    debug!("Authenticated {} ({}) on {}", user.name, user.id, path);
    request.extensions_mut().insert(user);

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    if gate.policy.is_never_cache(&path) {
        headers.insert(header::CACHE_CONTROL, header::HeaderValue::from_static("no-store"));
        headers.insert(header::PRAGMA, header::HeaderValue::from_static("no-cache"));
    } else {
        headers.insert(
            header::CACHE_CONTROL,
            header::HeaderValue::from_static("private, no-cache, no-store"),
        );
    }
    response
}
