//! Session cookie contract
//!
//! The session token travels in a single `auth-token` cookie: HttpOnly,
//! SameSite=Strict, path `/`, lifetime bounded to the token TTL, and Secure
//! in hardened deployments.

use http::HeaderMap;
use http::header::COOKIE;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "auth-token";

/// Cookie attributes fixed at startup.
#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    /// Set the `Secure` attribute. True in production, false only for local
    /// development over plain HTTP.
    pub secure: bool,
    /// Cookie lifetime in seconds; mirrors the token TTL.
    pub max_age_secs: i64,
}

/// Build the `Set-Cookie` value that installs a session.
pub fn build_session_cookie(token: &str, opts: CookieOptions) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        opts.max_age_secs
    );
    if opts.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the `Set-Cookie` value that deletes the session cookie.
pub fn build_clear_cookie(opts: CookieOptions) -> String {
    let mut cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
    if opts.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Extract the session token from the request's `Cookie` header(s).
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((name, token)) = pair.trim().split_once('=')
                && name == SESSION_COOKIE
                && !token.is_empty()
            {
                return Some(token.to_string());
            }
        }
    }
    None
}
