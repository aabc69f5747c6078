//! Employee directory endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use crewdesk_auth::{generate_salt, hash_password};
use crewdesk_db::models::{
    Employee, EmployeeQuery, EmployeeStatus, NewEmployee, UpdateEmployee,
};
use tracing::info;

use crate::error::ApiError;
use crate::routes::auth::RequireAuth;
use crate::routes::types::{
    ChangePasswordRequest, CreateEmployeeRequest, EmployeeSearchParams, EmployeeSearchResponse,
    UpdateEmployeeRequest,
};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/employees", get(search).post(create))
        .route(
            "/api/employees/{id}",
            get(get_one).put(update).delete(delete),
        )
        .route("/api/employees/{id}/password", put(change_password))
}

fn parse_status(status: &str) -> Result<EmployeeStatus, ApiError> {
    status
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("unknown status code: {status}")))
}

/// GET /api/employees
async fn search(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<EmployeeSearchParams>,
) -> Result<Json<EmployeeSearchResponse>, ApiError> {
    let status = params.status.as_deref().map(parse_status).transpose()?;
    let limit = if params.limit > 0 {
        params.limit.min(MAX_PAGE_SIZE)
    } else {
        DEFAULT_PAGE_SIZE
    };
    let offset = params.offset.max(0);

    let (employees, total) = state
        .db
        .search_employees(EmployeeQuery {
            name: params.name,
            position: params.position,
            department_id: params.department_id,
            status,
            offset,
            limit,
        })
        .await?;

    Ok(Json(EmployeeSearchResponse {
        employees,
        total,
        offset,
        limit,
    }))
}

/// GET /api/employees/{id}
async fn get_one(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Employee>, ApiError> {
    let employee = state
        .db
        .get_employee_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Employee: {id}")))?;
    Ok(Json(employee))
}

/// POST /api/employees
async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<CreateEmployeeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.full_name.trim().is_empty() {
        return Err(ApiError::BadRequest("full_name is required".to_string()));
    }
    if !request.email.contains('@') {
        return Err(ApiError::BadRequest("email is not valid".to_string()));
    }
    if request.password.len() < 8 {
        return Err(ApiError::BadRequest(
            "password must be at least 8 characters".to_string(),
        ));
    }
    let status = match request.status.as_deref() {
        Some(code) => parse_status(code)?,
        None => EmployeeStatus::Active,
    };

    let salt = generate_salt();
    let password = request.password;
    let hash_salt = salt.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, &hash_salt))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))??;

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
            status,
            created_by: Some(user.email),
        })
        .await?;

    info!("Employee {} created by {}", employee.employee_id, user.id);
    Ok((StatusCode::CREATED, Json(employee)))
}

/// PUT /api/employees/{id}, with partial-update semantics: absent fields
/// are untouched, explicit nulls clear nullable columns.
async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> Result<Json<Employee>, ApiError> {
    let status = request.status.as_deref().map(parse_status).transpose()?;
    if let Some(email) = &request.email
        && !email.contains('@')
    {
        return Err(ApiError::BadRequest("email is not valid".to_string()));
    }

    state
        .db
        .update_employee(
            id,
            UpdateEmployee {
                full_name: request.full_name,
                email: request.email,
                position: request.position,
                department_id: request.department_id,
                hire_date: request.hire_date,
                status,
            },
        )
        .await?;

    info!("Employee {} updated by {}", id, user.id);

    let employee = state
        .db
        .get_employee_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Employee: {id}")))?;
    Ok(Json(employee))
}

/// PUT /api/employees/{id}/password
async fn change_password(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    if request.password.len() < 8 {
        return Err(ApiError::BadRequest(
            "password must be at least 8 characters".to_string(),
        ));
    }

    let salt = generate_salt();
    let password = request.password;
    let hash_salt = salt.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, &hash_salt))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))??;

    let updated = state
        .db
        .update_employee_password(id, &password_hash, &salt)
        .await?;
    if !updated {
        return Err(ApiError::NotFound(format!("Employee: {id}")));
    }

    info!("Password for employee {} changed by {}", id, user.id);
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/employees/{id}
async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if id == user.id {
        return Err(ApiError::BadRequest(
            "cannot delete your own account".to_string(),
        ));
    }
    let deleted = state.db.delete_employee(id).await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Employee: {id}")));
    }
    info!("Employee {} deleted by {}", id, user.id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::create_router;
    use axum::body::{Body, to_bytes};
    use axum::http::{
        Request,
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
    };
    use axum::response::Response;
    use crewdesk_auth::{CookieOptions, PathPolicy, SessionGate, TokenCodec};
    use crewdesk_db::Database;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn test_state() -> AppState {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let codec = Arc::new(TokenCodec::new("employees-test-secret", 8));
        let cookies = CookieOptions {
            secure: false,
            max_age_secs: codec.ttl_seconds(),
        };
        AppState::new(db, codec, cookies, None, false)
    }

    fn test_app(state: &AppState) -> Router {
        let gate = Arc::new(SessionGate::new(
            state.codec.clone(),
            PathPolicy::default(),
            state.cookies,
        ));
        create_router(state.clone(), gate)
    }

    /// Seed an admin directly and mint their session cookie without paying
    /// for a full login round.
    async fn admin_cookie(state: &AppState) -> (i64, String) {
        let admin = state
            .db
            .insert_employee(NewEmployee {
                full_name: "Admin".to_string(),
                email: "admin@x.test".to_string(),
                password_hash: "00".to_string(),
                salt: "11".to_string(),
                position: Some("Administrator".to_string()),
                department_id: None,
                hire_date: None,
                status: EmployeeStatus::Active,
                created_by: None,
            })
            .await
            .unwrap();
        let token = state
            .codec
            .issue(admin.employee_id, "Admin", "admin@x.test", "Administrator", "A")
            .unwrap();
        (admin.employee_id, format!("auth-token={token}"))
    }

    async fn send(
        app: Router,
        method: &str,
        uri: &str,
        cookie: &str,
        body: Option<serde_json::Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri).header(COOKIE, cookie);
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        app.oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_requires_session() {
        let state = test_state().await;
        let response = test_app(&state)
            .oneshot(Request::builder().uri("/api/employees").body(Body::empty()).unwrap())
            .await
            .unwrap();
        // The gate redirects unauthenticated API calls to login.
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let state = test_state().await;
        let (_, cookie) = admin_cookie(&state).await;

        let response = send(
            test_app(&state),
            "POST",
            "/api/employees",
            &cookie,
            Some(json!({
                "full_name": "Jane Doe",
                "email": "jane@x.test",
                "password": "longenough",
                "position": "Engineer",
                "department_id": 3,
                "hire_date": "2024-06-01",
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        let id = body["employee_id"].as_i64().unwrap();
        assert_eq!(body["created_by"], "admin@x.test");
        // Credentials never serialize
        assert!(body.get("password_hash").is_none());
        assert!(body.get("salt").is_none());

        let response = send(
            test_app(&state),
            "GET",
            &format!("/api/employees/{id}"),
            &cookie,
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["full_name"], "Jane Doe");
        assert_eq!(body["hire_date"], "2024-06-01");
    }

    #[tokio::test]
    async fn test_search_pagination_and_filters() {
        let state = test_state().await;
        let (_, cookie) = admin_cookie(&state).await;

        for i in 0..5 {
            send(
                test_app(&state),
                "POST",
                "/api/employees",
                &cookie,
                Some(json!({
                    "full_name": format!("Employee {i}"),
                    "email": format!("e{i}@x.test"),
                    "password": "longenough",
                    "position": "Engineer",
                })),
            )
            .await;
        }

        let response = send(
            test_app(&state),
            "GET",
            "/api/employees?position=Engineer&limit=2&offset=0",
            &cookie,
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["total"], 5);
        assert_eq!(body["employees"].as_array().unwrap().len(), 2);

        let response = send(
            test_app(&state),
            "GET",
            "/api/employees?status=X",
            &cookie,
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_partial_update_clears_nullable_field() {
        let state = test_state().await;
        let (_, cookie) = admin_cookie(&state).await;

        let response = send(
            test_app(&state),
            "POST",
            "/api/employees",
            &cookie,
            Some(json!({
                "full_name": "Jane",
                "email": "jane@x.test",
                "password": "longenough",
                "position": "Engineer",
            })),
        )
        .await;
        let id = json_body(response).await["employee_id"].as_i64().unwrap();

        // Null clears position; absent fields are untouched.
        let response = send(
            test_app(&state),
            "PUT",
            &format!("/api/employees/{id}"),
            &cookie,
            Some(json!({ "position": null, "status": "I" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["position"], serde_json::Value::Null);
        assert_eq!(body["status"], "inactive");
        assert_eq!(body["full_name"], "Jane");
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let state = test_state().await;
        let (admin_id, cookie) = admin_cookie(&state).await;

        let response = send(
            test_app(&state),
            "DELETE",
            &format!("/api/employees/{admin_id}"),
            &cookie,
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            test_app(&state),
            "DELETE",
            "/api/employees/424242",
            &cookie,
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_change_password() {
        let state = test_state().await;
        let (_, cookie) = admin_cookie(&state).await;

        let response = send(
            test_app(&state),
            "POST",
            "/api/employees",
            &cookie,
            Some(json!({
                "full_name": "Jane",
                "email": "jane@x.test",
                "password": "first-password",
            })),
        )
        .await;
        let id = json_body(response).await["employee_id"].as_i64().unwrap();
        let before = state.db.get_employee_by_id(id).await.unwrap().unwrap();

        let response = send(
            test_app(&state),
            "PUT",
            &format!("/api/employees/{id}/password"),
            &cookie,
            Some(json!({ "password": "second-password" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let after = state.db.get_employee_by_id(id).await.unwrap().unwrap();
        assert_ne!(before.password_hash, after.password_hash);
        assert_ne!(before.salt, after.salt);
    }
}
