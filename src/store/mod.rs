use chrono::NaiveDate;

use crate::error::EngineError;
use crate::model::attendance::{AttendanceRecord, DayEntry};
use crate::model::employee::ActiveEmployee;
use crate::model::escalation::EscalationState;

pub mod mysql;

#[cfg(test)]
pub mod memory;

/// Durable storage of one attendance record per `(employee, date)`.
#[allow(async_fn_in_trait)]
pub trait AttendanceStore {
    /// Write a full day's batch for a department. Atomic across the whole
    /// list; an existing record for any `(employee_id, date)` pair is
    /// replaced, last write wins.
    ///
    /// The engine validates before calling: the date is the current day
    /// (never future), the department exists and the rows cover its active
    /// roster exactly. Implementations enforce only atomicity and the
    /// replace-on-conflict key.
    async fn upsert_day(
        &self,
        department_id: u64,
        date: NaiveDate,
        rows: &[DayEntry],
    ) -> Result<(), EngineError>;

    /// Stored records for a single day, empty if none were submitted.
    async fn day(
        &self,
        department_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, EngineError>;

    /// Inclusive date-range query used to build scan windows.
    async fn history(
        &self,
        department_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, EngineError>;

    /// Administrative reset: clear a bounded historical range. Returns the
    /// number of records removed.
    async fn delete_range(
        &self,
        department_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<u64, EngineError>;
}

/// Persisted per-employee escalation de-dup state. Writes for different
/// employees are independent; a single employee's state has one writer per
/// scan cycle.
#[allow(async_fn_in_trait)]
pub trait EscalationStateStore {
    async fn state(&self, employee_id: u64) -> Result<Option<EscalationState>, EngineError>;
    async fn put_state(&self, state: &EscalationState) -> Result<(), EngineError>;
}

/// Read-only view of the external employee directory.
#[allow(async_fn_in_trait)]
pub trait EmployeeDirectory {
    async fn active_employees(
        &self,
        department_id: u64,
    ) -> Result<Vec<ActiveEmployee>, EngineError>;

    /// Departments with at least one active employee, for the periodic scan.
    async fn department_ids(&self) -> Result<Vec<u64>, EngineError>;
}
