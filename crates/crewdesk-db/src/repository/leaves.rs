//! Leave request operations

use chrono::{NaiveDate, Utc};
use sqlx::Row;

use crate::error::DbError;
use crate::models::{LeaveRequest, LeaveStatus, NewLeaveRequest};
use crate::repository::Database;

const LEAVE_COLUMNS: &str =
    "id, employee_id, leave_type, start_date, end_date, reason, status, decided_by, created_at, updated_at";

impl Database {
    // ==================== Leave Request Operations ====================

    /// Insert a new leave request (always starts Pending)
    pub async fn insert_leave_request(
        &self,
        request: NewLeaveRequest,
    ) -> Result<LeaveRequest, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests (employee_id, leave_type, start_date, end_date, reason, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 'Pending', ?, ?)
            RETURNING id
            "#,
        )
        .bind(request.employee_id)
        .bind(&request.leave_type)
        .bind(request.start_date.to_string())
        .bind(request.end_date.to_string())
        .bind(&request.reason)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(LeaveRequest {
            id,
            employee_id: request.employee_id,
            leave_type: request.leave_type,
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason,
            status: LeaveStatus::Pending,
            decided_by: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a leave request by ID
    pub async fn get_leave_request(&self, id: i64) -> Result<Option<LeaveRequest>, DbError> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?");
        let result = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        result
            .map(|row| LeaveRequest::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// List leave requests, optionally filtered by employee and status
    pub async fn list_leave_requests(
        &self,
        employee_id: Option<i64>,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRequest>, DbError> {
        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(employee_id) = employee_id {
            conditions.push("employee_id = ?");
            params.push(employee_id.to_string());
        }
        if let Some(status) = status {
            conditions.push("status = ?");
            params.push(status.as_str().to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests {} ORDER BY start_date DESC",
            where_clause
        );

        let mut rows_query = sqlx::query(&sql);
        for param in &params {
            rows_query = rows_query.bind(param);
        }

        let rows = rows_query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| LeaveRequest::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// List leave requests overlapping a date range (for the calendar view)
    pub async fn list_leaves_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LeaveRequest>, DbError> {
        let sql = format!(
            r#"
            SELECT {LEAVE_COLUMNS} FROM leave_requests
            WHERE start_date <= ? AND end_date >= ?
            ORDER BY start_date
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(end.to_string())
            .bind(start.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| LeaveRequest::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Record an approval/rejection decision on a pending request
    pub async fn decide_leave_request(
        &self,
        id: i64,
        status: LeaveStatus,
        decided_by: i64,
    ) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, decided_by = ?, updated_at = ?
            WHERE id = ? AND status = 'Pending'
            "#,
        )
        .bind(status.as_str())
        .bind(decided_by)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a leave request (withdrawing a pending application)
    pub async fn delete_leave_request(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM leave_requests WHERE id = ? AND status = 'Pending'")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmployeeStatus, NewEmployee};

    async fn test_db_with_employee() -> (Database, i64) {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let employee = db
            .insert_employee(NewEmployee {
                full_name: "Jane".to_string(),
                email: "jane@x.test".to_string(),
                password_hash: "00".to_string(),
                salt: "11".to_string(),
                position: None,
                department_id: None,
                hire_date: None,
                status: EmployeeStatus::Active,
                created_by: None,
            })
            .await
            .unwrap();
        (db, employee.employee_id)
    }

    fn leave(employee_id: i64, start: (i32, u32, u32), end: (i32, u32, u32)) -> NewLeaveRequest {
        NewLeaveRequest {
            employee_id,
            leave_type: "Annual".to_string(),
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            reason: Some("holiday".to_string()),
        }
    }

    #[tokio::test]
    async fn test_apply_and_fetch() {
        let (db, employee_id) = test_db_with_employee().await;
        let request = db
            .insert_leave_request(leave(employee_id, (2025, 7, 1), (2025, 7, 5)))
            .await
            .unwrap();
        assert_eq!(request.status, LeaveStatus::Pending);

        let fetched = db.get_leave_request(request.id).await.unwrap().unwrap();
        assert_eq!(fetched.start_date, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        assert_eq!(fetched.decided_by, None);
    }

    #[tokio::test]
    async fn test_decision_flow() {
        let (db, employee_id) = test_db_with_employee().await;
        let request = db
            .insert_leave_request(leave(employee_id, (2025, 7, 1), (2025, 7, 5)))
            .await
            .unwrap();

        assert!(
            db.decide_leave_request(request.id, LeaveStatus::Approved, 99)
                .await
                .unwrap()
        );
        let fetched = db.get_leave_request(request.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, LeaveStatus::Approved);
        assert_eq!(fetched.decided_by, Some(99));

        // A decided request cannot be decided again
        assert!(
            !db.decide_leave_request(request.id, LeaveStatus::Rejected, 99)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_list_filters() {
        let (db, employee_id) = test_db_with_employee().await;
        let first = db
            .insert_leave_request(leave(employee_id, (2025, 7, 1), (2025, 7, 5)))
            .await
            .unwrap();
        db.insert_leave_request(leave(employee_id, (2025, 8, 1), (2025, 8, 2)))
            .await
            .unwrap();
        db.decide_leave_request(first.id, LeaveStatus::Approved, 1)
            .await
            .unwrap();

        let pending = db
            .list_leave_requests(Some(employee_id), Some(LeaveStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        let all = db.list_leave_requests(None, None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_calendar_range_overlap() {
        let (db, employee_id) = test_db_with_employee().await;
        db.insert_leave_request(leave(employee_id, (2025, 6, 28), (2025, 7, 2)))
            .await
            .unwrap();
        db.insert_leave_request(leave(employee_id, (2025, 7, 10), (2025, 7, 12)))
            .await
            .unwrap();
        db.insert_leave_request(leave(employee_id, (2025, 8, 1), (2025, 8, 3)))
            .await
            .unwrap();

        // July window picks up the overlap from June and the mid-July leave,
        // but not August.
        let july = db
            .list_leaves_between(
                NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(july.len(), 2);
    }

    #[tokio::test]
    async fn test_withdraw_pending_only() {
        let (db, employee_id) = test_db_with_employee().await;
        let request = db
            .insert_leave_request(leave(employee_id, (2025, 7, 1), (2025, 7, 5)))
            .await
            .unwrap();
        db.decide_leave_request(request.id, LeaveStatus::Approved, 1)
            .await
            .unwrap();
        assert!(!db.delete_leave_request(request.id).await.unwrap());

        let pending = db
            .insert_leave_request(leave(employee_id, (2025, 9, 1), (2025, 9, 2)))
            .await
            .unwrap();
        assert!(db.delete_leave_request(pending.id).await.unwrap());
    }
}
