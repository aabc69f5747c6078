//! Session authentication endpoints
//!
//! `/api/auth/login` exchanges an employee ID and password for a session
//! cookie, `/api/auth/verify` re-validates the current session against the
//! store, `/api/auth/logout` tears the session down, and
//! `/api/auth/register` creates an account when the deployment carries a
//! registration secret.

use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use crewdesk_auth::{
    AuthError, AuthUser, CookieOptions, build_clear_cookie, build_session_cookie, generate_salt,
    hash_password, session_token, verify_password,
};
use crewdesk_auth::password::burn;
use crewdesk_db::models::{EmployeeStatus, NewEmployee};
use serde_json::json;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::routes::types::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, RegisteredUser, SessionMeta,
    UserPayload, VerifyResponse,
};
use crate::state::{AccountCheck, AppState};

const MAX_PASSWORD_LEN: usize = 256;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/verify", get(verify))
        .route("/api/auth/logout", get(logout).post(logout))
        .route("/api/auth/register", post(register))
}

/// Extractor for handlers that require an authenticated caller.
///
/// The session gate normally inserts the user into request extensions; when
/// a route is reachable without the gate the cookie is verified directly.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(RequireAuth(user.clone()));
        }
        let token = session_token(&parts.headers).ok_or(AuthError::TokenMissing)?;
        let claims = state.codec.verify(&token)?;
        Ok(RequireAuth(AuthUser::from_claims(&claims)?))
    }
}

/// Run a password derivation off the async runtime.
async fn blocking_kdf<F, T>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))
}

/// Attach the clear-cookie header to an auth failure response when the
/// failure invalidates the presented cookie.
fn auth_failure(
    cookies: CookieOptions,
    err: AuthError,
    detail: Option<String>,
) -> Response {
    let clear = err.clears_cookie();
    let mut response = match detail {
        Some(detail) => ApiError::AuthDetail { source: err, detail }.into_response(),
        None => ApiError::Auth(err).into_response(),
    };
    if clear && let Ok(value) = HeaderValue::from_str(&build_clear_cookie(cookies)) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

fn disable_caching(response: &mut Response) {
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
}

/// POST /api/auth/login
///
/// Every failure mode returns the same invalid-credentials error, including
/// a correct password on an inactive account. A login attempt against a
/// nonexistent ID still pays for one derivation so attempts cannot be used
/// to probe which IDs exist.
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if request.employee_id <= 0
        || request.password.is_empty()
        || request.password.len() > MAX_PASSWORD_LEN
    {
        return Err(ApiError::BadRequest(
            "employee_id and password are required".to_string(),
        ));
    }

    let Some(employee) = state.db.get_employee_by_id(request.employee_id).await? else {
        let password = request.password;
        blocking_kdf(move || burn(&password)).await?;
        return Err(AuthError::CredentialsInvalid.into());
    };

    let password = request.password;
    let stored_digest = employee.password_hash.clone();
    let salt = employee.salt.clone();
    let verified =
        blocking_kdf(move || verify_password(&password, &stored_digest, &salt)).await??;

    if !verified || employee.status != EmployeeStatus::Active {
        warn!("Failed login attempt for employee {}", request.employee_id);
        return Err(AuthError::CredentialsInvalid.into());
    }

    if let Err(e) = state.db.update_last_login(employee.employee_id).await {
        // The session is still valid without the stamp.
        warn!("Could not record last login for {}: {}", employee.employee_id, e);
    }

    let role = employee.position.clone().unwrap_or_default();
    let token = state.codec.issue(
        employee.employee_id,
        &employee.full_name,
        &employee.email,
        &role,
        employee.status.as_str(),
    )?;

    info!("Employee {} logged in", employee.employee_id);

    let mut response = Json(LoginResponse {
        success: true,
        user: UserPayload::from(&employee),
    })
    .into_response();
    if let Ok(value) = HeaderValue::from_str(&build_session_cookie(&token, state.cookies)) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    Ok(response)
}

/// GET /api/auth/verify
///
/// Verifies the cookie offline, then re-checks the account's current status
/// against the store. Concurrent verifies for the same employee share one
/// status lookup. Store trouble fails closed as an invalid session.
async fn verify(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let claims = match session_token(&headers)
        .ok_or(AuthError::TokenMissing)
        .and_then(|token| state.codec.verify(&token))
    {
        Ok(claims) => claims,
        Err(err) => return auth_failure(state.cookies, err, None),
    };

    let user = match AuthUser::from_claims(&claims) {
        Ok(user) => user,
        Err(err) => return auth_failure(state.cookies, err, None),
    };

    let db = state.db.clone();
    let employee_id = user.id;
    let check = state
        .status_checks
        .run(employee_id, async move {
            match db.get_employee_status(employee_id).await {
                Ok(Some(EmployeeStatus::Active)) => AccountCheck::Active,
                Ok(Some(EmployeeStatus::Inactive)) => AccountCheck::Inactive,
                Ok(None) => AccountCheck::NotFound,
                Err(e) => AccountCheck::Unavailable(e.to_string()),
            }
        })
        .await;

    match check {
        AccountCheck::Active => {}
        AccountCheck::Inactive => {
            return auth_failure(state.cookies, AuthError::AccountInactive, None);
        }
        AccountCheck::NotFound => {
            return auth_failure(state.cookies, AuthError::AccountNotFound, None);
        }
        AccountCheck::Unavailable(detail) => {
            warn!("Status recheck unavailable for {}: {}", employee_id, detail);
            let detail = state.dev_mode.then_some(detail);
            return auth_failure(state.cookies, AuthError::TokenSignatureInvalid, detail);
        }
    }

    let mut response = Json(VerifyResponse {
        user: UserPayload::from(&user),
        meta: SessionMeta {
            issued_at: claims.iat,
            expires_at: claims.exp,
            ttl_seconds: state.codec.ttl_seconds(),
        },
    })
    .into_response();
    disable_caching(&mut response);
    response
}

/// Logout is idempotent: the cookie is cleared whether or not a session was
/// present, and client-side state is told to flush via Clear-Site-Data.
async fn logout(State(state): State<AppState>) -> Response {
    let mut response = Json(json!({ "success": true })).into_response();
    if let Ok(value) = HeaderValue::from_str(&build_clear_cookie(state.cookies)) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response.headers_mut().insert(
        header::HeaderName::from_static("clear-site-data"),
        HeaderValue::from_static("\"cookies\", \"storage\""),
    );
    disable_caching(&mut response);
    response
}

/// POST /api/auth/register
///
/// Gated by a shared secret. A deployment without the secret configured has
/// registration disabled outright.
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let Some(expected) = &state.register_secret else {
        return Err(ApiError::Unavailable(
            "registration is not configured".to_string(),
        ));
    };
    if request.secret != *expected {
        warn!("Registration attempt with wrong secret for {}", request.email);
        return Err(ApiError::Forbidden("invalid registration secret".to_string()));
    }

    if request.full_name.trim().is_empty() {
        return Err(ApiError::BadRequest("full_name is required".to_string()));
    }
    if !request.email.contains('@') {
        return Err(ApiError::BadRequest("email is not valid".to_string()));
    }
    if request.password.len() < 8 || request.password.len() > MAX_PASSWORD_LEN {
        return Err(ApiError::BadRequest(
            "password must be between 8 and 256 characters".to_string(),
        ));
    }

    let salt = generate_salt();
    let password = request.password;
    let hash_salt = salt.clone();
    let password_hash = blocking_kdf(move || hash_password(&password, &hash_salt)).await??;

    let employee = state
        .db
        .insert_employee(NewEmployee {
            full_name: request.full_name.trim().to_string(),
            email: request.email,
            password_hash,
            salt,
            position: request.position,
            department_id: request.department_id,
            hire_date: request.hire_date,
            status: EmployeeStatus::Active,
            created_by: Some("self-register".to_string()),
        })
        .await?;

    info!("Registered employee {}", employee.employee_id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            user: RegisteredUser {
                id: employee.employee_id,
                name: employee.full_name,
            },
        }),
    )
        .into_response())
}
