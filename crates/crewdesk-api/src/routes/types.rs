//! Request and response types for the REST API

use chrono::NaiveDate;
use crewdesk_auth::AuthUser;
use crewdesk_db::models::{Employee, LeaveStatus};
use serde::{Deserialize, Deserializer, Serialize};

/// Distinguishes "field absent" from "field explicitly set to null" in
/// partial updates.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

// ==================== Auth ====================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub employee_id: i64,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserPayload {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
}

impl From<&Employee> for UserPayload {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.employee_id,
            name: employee.full_name.clone(),
            email: employee.email.clone(),
            role: employee.position.clone().unwrap_or_default(),
            status: employee.status.as_str().to_string(),
        }
    }
}

impl From<&AuthUser> for UserPayload {
    fn from(user: &AuthUser) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            status: user.status.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: UserPayload,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionMeta {
    pub issued_at: i64,
    pub expires_at: i64,
    pub ttl_seconds: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub user: UserPayload,
    pub meta: SessionMeta,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub secret: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub position: Option<String>,
    pub department_id: Option<i64>,
    pub hire_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub user: RegisteredUser,
}

// ==================== Employees ====================

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub position: Option<String>,
    pub department_id: Option<i64>,
    pub hire_date: Option<NaiveDate>,
    /// Account status code (`A` or `I`); defaults to active.
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateEmployeeRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub position: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub department_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub hire_date: Option<Option<NaiveDate>>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct EmployeeSearchParams {
    pub name: Option<String>,
    pub position: Option<String>,
    pub department_id: Option<i64>,
    pub status: Option<String>,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub limit: i64,
}

#[derive(Debug, Serialize)]
pub struct EmployeeSearchResponse {
    pub employees: Vec<Employee>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

// ==================== Leaves ====================

#[derive(Debug, Deserialize)]
pub struct ApplyLeaveRequest {
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LeaveListParams {
    pub employee_id: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarParams {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: LeaveStatus,
}
