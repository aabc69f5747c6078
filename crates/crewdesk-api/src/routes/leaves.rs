//! Leave workflow endpoints
//!
//! Employees apply for leave on their own behalf; decisions are recorded
//! against pending requests only and stamp who decided. The calendar view
//! returns every request overlapping a date window.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use crewdesk_db::models::{LeaveRequest, LeaveStatus, NewLeaveRequest};
use tracing::info;

use crate::error::ApiError;
use crate::routes::auth::RequireAuth;
use crate::routes::types::{ApplyLeaveRequest, CalendarParams, DecisionRequest, LeaveListParams};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/leaves", get(list).post(apply))
        .route("/api/leaves/calendar", get(calendar))
        .route("/api/leaves/{id}", get(get_one).delete(withdraw))
        .route("/api/leaves/{id}/decision", put(decide))
}

/// POST /api/leaves
async fn apply(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<ApplyLeaveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.leave_type.trim().is_empty() {
        return Err(ApiError::BadRequest("leave_type is required".to_string()));
    }
    if request.end_date < request.start_date {
        return Err(ApiError::BadRequest(
            "end_date must not precede start_date".to_string(),
        ));
    }

    let leave = state
        .db
        .insert_leave_request(NewLeaveRequest {
            employee_id: user.id,
            leave_type: request.leave_type.trim().to_string(),
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason,
        })
        .await?;

    info!("Leave request {} filed by employee {}", leave.id, user.id);
    Ok((StatusCode::CREATED, Json(leave)))
}

/// GET /api/leaves
async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<LeaveListParams>,
) -> Result<Json<Vec<LeaveRequest>>, ApiError> {
    let status = params
        .status
        .as_deref()
        .map(|s| {
            s.parse::<LeaveStatus>()
                .map_err(|_| ApiError::BadRequest(format!("unknown leave status: {s}")))
        })
        .transpose()?;

    let leaves = state.db.list_leave_requests(params.employee_id, status).await?;
    Ok(Json(leaves))
}

/// GET /api/leaves/calendar?start=...&end=...
async fn calendar(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<CalendarParams>,
) -> Result<Json<Vec<LeaveRequest>>, ApiError> {
    if params.end < params.start {
        return Err(ApiError::BadRequest(
            "end must not precede start".to_string(),
        ));
    }
    let leaves = state.db.list_leaves_between(params.start, params.end).await?;
    Ok(Json(leaves))
}

/// GET /api/leaves/{id}
async fn get_one(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<LeaveRequest>, ApiError> {
    let leave = state
        .db
        .get_leave_request(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Leave request: {id}")))?;
    Ok(Json(leave))
}

/// PUT /api/leaves/{id}/decision
async fn decide(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<LeaveRequest>, ApiError> {
    if request.decision == LeaveStatus::Pending {
        return Err(ApiError::BadRequest(
            "decision must be Approved or Rejected".to_string(),
        ));
    }

    let leave = state
        .db
        .get_leave_request(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Leave request: {id}")))?;
    if leave.employee_id == user.id {
        return Err(ApiError::Forbidden(
            "cannot decide your own leave request".to_string(),
        ));
    }

    let decided = state.db.decide_leave_request(id, request.decision, user.id).await?;
    if !decided {
        return Err(ApiError::BadRequest(
            "leave request has already been decided".to_string(),
        ));
    }

    info!("Leave request {} {:?} by {}", id, request.decision, user.id);

    let leave = state
        .db
        .get_leave_request(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Leave request: {id}")))?;
    Ok(Json(leave))
}

/// DELETE /api/leaves/{id}
///
/// Withdraws a pending request; only the applicant may withdraw, and a
/// decided request stays on record.
async fn withdraw(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let leave = state
        .db
        .get_leave_request(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Leave request: {id}")))?;
    if leave.employee_id != user.id {
        return Err(ApiError::Forbidden(
            "only the applicant can withdraw a leave request".to_string(),
        ));
    }

    let deleted = state.db.delete_leave_request(id).await?;
    if !deleted {
        return Err(ApiError::BadRequest(
            "only pending requests can be withdrawn".to_string(),
        ));
    }

    info!("Leave request {} withdrawn by {}", id, user.id);
    Ok(StatusCode::NO_CONTENT)
}
