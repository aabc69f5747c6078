//! Database models

use crate::utils::{parse_date, parse_datetime_or_now};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

/// Error type for parsing models from strings
#[derive(Debug, Clone)]
pub enum ParseError {
    InvalidEmployeeStatus(String),
    InvalidLeaveStatus(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidEmployeeStatus(s) => write!(f, "Invalid employee status: {}", s),
            ParseError::InvalidLeaveStatus(s) => write!(f, "Invalid leave status: {}", s),
        }
    }
}

impl std::error::Error for ParseError {}

/// Employee account status
///
/// Stored as single-character codes (`A`/`I`). An inactive account must never
/// yield a valid session, even with the correct password.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "A",
            EmployeeStatus::Inactive => "I",
        }
    }
}

impl FromStr for EmployeeStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(EmployeeStatus::Active),
            "I" => Ok(EmployeeStatus::Inactive),
            _ => Err(ParseError::InvalidEmployeeStatus(s.to_string())),
        }
    }
}

/// Leave request status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "Pending",
            LeaveStatus::Approved => "Approved",
            LeaveStatus::Rejected => "Rejected",
        }
    }
}

impl FromStr for LeaveStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(LeaveStatus::Pending),
            "Approved" => Ok(LeaveStatus::Approved),
            "Rejected" => Ok(LeaveStatus::Rejected),
            _ => Err(ParseError::InvalidLeaveStatus(s.to_string())),
        }
    }
}

/// Employee credential record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: i64,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub salt: String,
    pub position: Option<String>,
    pub department_id: Option<i64>,
    pub hire_date: Option<NaiveDate>,
    pub status: EmployeeStatus,
    pub last_login: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New employee (for insertion)
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub position: Option<String>,
    pub department_id: Option<i64>,
    pub hire_date: Option<NaiveDate>,
    pub status: EmployeeStatus,
    pub created_by: Option<String>,
}

/// Update employee (for partial updates)
#[derive(Debug, Clone, Default)]
pub struct UpdateEmployee {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub position: Option<Option<String>>,
    pub department_id: Option<Option<i64>>,
    pub hire_date: Option<Option<NaiveDate>>,
    pub status: Option<EmployeeStatus>,
}

/// Employee search filters
#[derive(Debug, Clone, Default)]
pub struct EmployeeQuery {
    pub name: Option<String>,
    pub position: Option<String>,
    pub department_id: Option<i64>,
    pub status: Option<EmployeeStatus>,
    pub offset: i64,
    pub limit: i64,
}

/// Leave request record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: i64,
    pub employee_id: i64,
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    pub decided_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New leave request (for insertion)
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: i64,
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for Employee {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let status_str: String = row.try_get("status")?;
        Ok(Employee {
            employee_id: row.try_get("employee_id")?,
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            salt: row.try_get("salt")?,
            position: row.try_get("position")?,
            department_id: row.try_get("department_id")?,
            hire_date: row
                .try_get::<Option<String>, _>("hire_date")?
                .as_deref()
                .and_then(parse_date),
            status: EmployeeStatus::from_str(&status_str).unwrap_or(EmployeeStatus::Inactive),
            last_login: row
                .try_get::<Option<String>, _>("last_login")?
                .as_deref()
                .map(parse_datetime_or_now),
            created_by: row.try_get("created_by")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for LeaveRequest {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let status_str: String = row.try_get("status")?;
        let start: String = row.try_get("start_date")?;
        let end: String = row.try_get("end_date")?;
        Ok(LeaveRequest {
            id: row.try_get("id")?,
            employee_id: row.try_get("employee_id")?,
            leave_type: row.try_get("leave_type")?,
            start_date: parse_date(&start)
                .ok_or_else(|| sqlx::Error::Decode(format!("bad start_date: {start}").into()))?,
            end_date: parse_date(&end)
                .ok_or_else(|| sqlx::Error::Decode(format!("bad end_date: {end}").into()))?,
            reason: row.try_get("reason")?,
            status: LeaveStatus::from_str(&status_str).unwrap_or(LeaveStatus::Pending),
            decided_by: row.try_get("decided_by")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_status_roundtrip() {
        assert_eq!(EmployeeStatus::from_str("A").unwrap(), EmployeeStatus::Active);
        assert_eq!(EmployeeStatus::from_str("I").unwrap(), EmployeeStatus::Inactive);
        assert_eq!(EmployeeStatus::Active.as_str(), "A");
        assert!(EmployeeStatus::from_str("X").is_err());
    }

    #[test]
    fn test_leave_status_roundtrip() {
        for status in [LeaveStatus::Pending, LeaveStatus::Approved, LeaveStatus::Rejected] {
            assert_eq!(LeaveStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(LeaveStatus::from_str("Maybe").is_err());
    }

    #[test]
    fn test_credentials_not_serialized() {
        let employee = Employee {
            employee_id: 1,
            full_name: "Jane".into(),
            email: "jane@x.test".into(),
            password_hash: "deadbeef".into(),
            salt: "cafe".into(),
            position: None,
            department_id: None,
            hire_date: None,
            status: EmployeeStatus::Active,
            last_login: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&employee).unwrap();
        assert!(!json.contains("deadbeef"));
        assert!(!json.contains("cafe"));
    }
}
