//! MySQL-backed stores.
//!
//! Expected tables (provisioned externally, alongside the HR schema):
//!
//! ```sql
//! CREATE TABLE attendance_records (
//!     employee_id   BIGINT UNSIGNED NOT NULL,
//!     date          DATE            NOT NULL,
//!     status        VARCHAR(16)     NOT NULL,
//!     department_id BIGINT UNSIGNED NOT NULL,
//!     marked_by     BIGINT UNSIGNED NOT NULL,
//!     PRIMARY KEY (employee_id, date),
//!     KEY idx_department_date (department_id, date)
//! );
//!
//! CREATE TABLE escalation_states (
//!     employee_id                BIGINT UNSIGNED NOT NULL PRIMARY KEY,
//!     last_notified_run_end_date DATE            NOT NULL,
//!     last_notified_run_length   INT UNSIGNED    NOT NULL
//! );
//!
//! CREATE TABLE notification_outbox (
//!     dedupe_key     CHAR(36)        NOT NULL PRIMARY KEY,
//!     recipient_role VARCHAR(32)     NOT NULL,
//!     employee_id    BIGINT UNSIGNED NOT NULL,
//!     department_id  BIGINT UNSIGNED NOT NULL,
//!     severity       VARCHAR(16)     NOT NULL,
//!     message        TEXT            NOT NULL,
//!     created_at     TIMESTAMP       NOT NULL DEFAULT CURRENT_TIMESTAMP
//! );
//! ```

use chrono::NaiveDate;
use sqlx::{FromRow, MySqlPool};

use crate::error::EngineError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, DayEntry};
use crate::model::employee::ActiveEmployee;
use crate::model::escalation::{EscalationState, NotificationRequest};
use crate::notifier::NotificationSink;
use crate::store::{AttendanceStore, EmployeeDirectory, EscalationStateStore};
use crate::utils::directory_cache;

#[derive(FromRow)]
struct AttendanceRow {
    employee_id: u64,
    date: NaiveDate,
    status: String,
    department_id: u64,
    marked_by: u64,
}

impl AttendanceRow {
    fn into_record(self) -> Result<AttendanceRecord, EngineError> {
        let status = self
            .status
            .parse::<AttendanceStatus>()
            .map_err(|e| EngineError::Repository(sqlx::Error::Decode(Box::new(e))))?;
        Ok(AttendanceRecord {
            employee_id: self.employee_id,
            date: self.date,
            status,
            department_id: self.department_id,
            marked_by: self.marked_by,
        })
    }
}

fn into_records(rows: Vec<AttendanceRow>) -> Result<Vec<AttendanceRecord>, EngineError> {
    rows.into_iter().map(AttendanceRow::into_record).collect()
}

#[derive(Clone)]
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl AttendanceStore for MySqlAttendanceStore {
    async fn upsert_day(
        &self,
        department_id: u64,
        date: NaiveDate,
        rows: &[DayEntry],
    ) -> Result<(), EngineError> {
        // One transaction for the whole sheet: a scan must never observe a
        // half-written day, and a failed batch must leave nothing behind.
        let mut tx = self.pool.begin().await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO attendance_records
                    (employee_id, date, status, department_id, marked_by)
                VALUES (?, ?, ?, ?, ?)
                ON DUPLICATE KEY UPDATE
                    status = VALUES(status),
                    department_id = VALUES(department_id),
                    marked_by = VALUES(marked_by)
                "#,
            )
            .bind(row.employee_id)
            .bind(date)
            .bind(row.status.to_string())
            .bind(department_id)
            .bind(row.marked_by)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn day(
        &self,
        department_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, EngineError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT employee_id, date, status, department_id, marked_by
            FROM attendance_records
            WHERE department_id = ? AND date = ?
            ORDER BY employee_id
            "#,
        )
        .bind(department_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    async fn history(
        &self,
        department_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, EngineError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT employee_id, date, status, department_id, marked_by
            FROM attendance_records
            WHERE department_id = ? AND date BETWEEN ? AND ?
            ORDER BY employee_id, date
            "#,
        )
        .bind(department_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    async fn delete_range(
        &self,
        department_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<u64, EngineError> {
        let result = sqlx::query(
            r#"
            DELETE FROM attendance_records
            WHERE department_id = ? AND date BETWEEN ? AND ?
            "#,
        )
        .bind(department_id)
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[derive(Clone)]
pub struct MySqlEscalationStateStore {
    pool: MySqlPool,
}

impl MySqlEscalationStateStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct EscalationStateRow {
    employee_id: u64,
    last_notified_run_end_date: NaiveDate,
    last_notified_run_length: u32,
}

impl EscalationStateStore for MySqlEscalationStateStore {
    async fn state(&self, employee_id: u64) -> Result<Option<EscalationState>, EngineError> {
        let row = sqlx::query_as::<_, EscalationStateRow>(
            r#"
            SELECT employee_id, last_notified_run_end_date, last_notified_run_length
            FROM escalation_states
            WHERE employee_id = ?
            "#,
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| EscalationState {
            employee_id: r.employee_id,
            last_notified_run_end_date: r.last_notified_run_end_date,
            last_notified_run_length: r.last_notified_run_length,
        }))
    }

    async fn put_state(&self, state: &EscalationState) -> Result<(), EngineError> {
        sqlx::query(
            r#"
            INSERT INTO escalation_states
                (employee_id, last_notified_run_end_date, last_notified_run_length)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE
                last_notified_run_end_date = VALUES(last_notified_run_end_date),
                last_notified_run_length = VALUES(last_notified_run_length)
            "#,
        )
        .bind(state.employee_id)
        .bind(state.last_notified_run_end_date)
        .bind(state.last_notified_run_length)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Directory reads go through the moka cache; the employees table is owned
/// by the HR side and only consulted here.
#[derive(Clone)]
pub struct MySqlEmployeeDirectory {
    pool: MySqlPool,
}

impl MySqlEmployeeDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl EmployeeDirectory for MySqlEmployeeDirectory {
    async fn active_employees(
        &self,
        department_id: u64,
    ) -> Result<Vec<ActiveEmployee>, EngineError> {
        let employees = directory_cache::active_employees(&self.pool, department_id).await?;
        Ok(employees.as_ref().clone())
    }

    async fn department_ids(&self) -> Result<Vec<u64>, EngineError> {
        let ids = sqlx::query_as::<_, (u64,)>(
            r#"
            SELECT DISTINCT department_id
            FROM employees
            WHERE status = 'active'
            ORDER BY department_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}

/// Production notification sink: one outbox row per payload. The external
/// notification service drains the outbox with at-least-once semantics;
/// retries and read tracking are its concern.
#[derive(Clone)]
pub struct MySqlNotificationOutbox {
    pool: MySqlPool,
}

impl MySqlNotificationOutbox {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl NotificationSink for MySqlNotificationOutbox {
    async fn submit(&self, request: &NotificationRequest) -> Result<(), EngineError> {
        sqlx::query(
            r#"
            INSERT INTO notification_outbox
                (dedupe_key, recipient_role, employee_id, department_id, severity, message)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.dedupe_key.to_string())
        .bind(request.recipient_role.to_string())
        .bind(request.employee_id)
        .bind(request.department_id)
        .bind(request.severity.to_string())
        .bind(&request.message)
        .execute(&self.pool)
        .await
        .map_err(|e| EngineError::NotificationDelivery(e.to_string()))?;

        Ok(())
    }
}
