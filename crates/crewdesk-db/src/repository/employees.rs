//! Employee operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Employee, EmployeeQuery, EmployeeStatus, NewEmployee, UpdateEmployee};
use crate::repository::Database;

const EMPLOYEE_COLUMNS: &str = "employee_id, full_name, email, password_hash, salt, position, \
     department_id, hire_date, status, last_login, created_by, created_at, updated_at";

impl Database {
    // ==================== Employee Operations ====================

    /// Insert a new employee
    pub async fn insert_employee(&self, employee: NewEmployee) -> Result<Employee, DbError> {
        let now = Utc::now();

        // Check for a duplicate email before inserting
        let existing = self.get_employee_by_email(&employee.email).await?;
        if existing.is_some() {
            return Err(DbError::Duplicate(format!(
                "Email '{}' is already registered",
                employee.email
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO employees (full_name, email, password_hash, salt, position, department_id, hire_date, status, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING employee_id
            "#,
        )
        .bind(&employee.full_name)
        .bind(&employee.email)
        .bind(&employee.password_hash)
        .bind(&employee.salt)
        .bind(&employee.position)
        .bind(employee.department_id)
        .bind(employee.hire_date.map(|d| d.to_string()))
        .bind(employee.status.as_str())
        .bind(&employee.created_by)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("employee_id");

        Ok(Employee {
            employee_id: id,
            full_name: employee.full_name,
            email: employee.email,
            password_hash: employee.password_hash,
            salt: employee.salt,
            position: employee.position,
            department_id: employee.department_id,
            hire_date: employee.hire_date,
            status: employee.status,
            last_login: None,
            created_by: employee.created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get an employee by ID
    pub async fn get_employee_by_id(&self, id: i64) -> Result<Option<Employee>, DbError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_id = ?");
        let result = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        result
            .map(|row| Employee::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Get an employee by email
    pub async fn get_employee_by_email(&self, email: &str) -> Result<Option<Employee>, DbError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE email = ?");
        let result = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        result
            .map(|row| Employee::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Search employees with filtering and pagination
    pub async fn search_employees(
        &self,
        query: EmployeeQuery,
    ) -> Result<(Vec<Employee>, i64), DbError> {
        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(name) = &query.name {
            conditions.push("full_name LIKE ?");
            params.push(format!("%{}%", name));
        }
        if let Some(position) = &query.position {
            conditions.push("position = ?");
            params.push(position.clone());
        }
        if let Some(department_id) = query.department_id {
            conditions.push("department_id = ?");
            params.push(department_id.to_string());
        }
        if let Some(status) = query.status {
            conditions.push("status = ?");
            params.push(status.as_str().to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) as count FROM employees {}", where_clause);
        let mut count_query = sqlx::query(&count_sql);
        for param in &params {
            count_query = count_query.bind(param);
        }
        let count_row = count_query.fetch_one(&self.pool).await?;
        let total: i64 = count_row.get("count");

        let limit = if query.limit > 0 { query.limit } else { 50 };
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees {} ORDER BY full_name LIMIT ? OFFSET ?",
            where_clause
        );

        let mut rows_query = sqlx::query(&sql);
        for param in &params {
            rows_query = rows_query.bind(param);
        }
        rows_query = rows_query.bind(limit).bind(query.offset.max(0));

        let rows = rows_query.fetch_all(&self.pool).await?;
        let employees: Result<Vec<Employee>, _> = rows
            .iter()
            .map(|row| Employee::try_from(row).map_err(DbError::from))
            .collect();

        Ok((employees?, total))
    }

    /// Apply a partial update to an employee
    pub async fn update_employee(&self, id: i64, update: UpdateEmployee) -> Result<bool, DbError> {
        let existing = self
            .get_employee_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Employee: {}", id)))?;

        let full_name = update.full_name.unwrap_or(existing.full_name);
        let email = update.email.unwrap_or(existing.email);
        let position = update.position.unwrap_or(existing.position);
        let department_id = update.department_id.unwrap_or(existing.department_id);
        let hire_date = update.hire_date.unwrap_or(existing.hire_date);
        let status = update.status.unwrap_or(existing.status);

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET full_name = ?, email = ?, position = ?, department_id = ?, hire_date = ?, status = ?, updated_at = ?
            WHERE employee_id = ?
            "#,
        )
        .bind(&full_name)
        .bind(&email)
        .bind(&position)
        .bind(department_id)
        .bind(hire_date.map(|d| d.to_string()))
        .bind(status.as_str())
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Update an employee's credential pair
    pub async fn update_employee_password(
        &self,
        id: i64,
        password_hash: &str,
        salt: &str,
    ) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET password_hash = ?, salt = ?, updated_at = ?
            WHERE employee_id = ?
            "#,
        )
        .bind(password_hash)
        .bind(salt)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Stamp the last successful login time
    pub async fn update_last_login(&self, id: i64) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET last_login = ?
            WHERE employee_id = ?
            "#,
        )
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an employee
    pub async fn delete_employee(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM employees WHERE employee_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check if any employees exist
    pub async fn has_employees(&self) -> Result<bool, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM employees")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = result.get("count");
        Ok(count > 0)
    }

    /// Fetch the current account status, if the employee still exists
    pub async fn get_employee_status(&self, id: i64) -> Result<Option<EmployeeStatus>, DbError> {
        let result = sqlx::query("SELECT status FROM employees WHERE employee_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(result.map(|row| {
            row.get::<String, _>("status")
                .parse()
                .unwrap_or(EmployeeStatus::Inactive)
        }))
    }
}
