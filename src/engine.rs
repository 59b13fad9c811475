use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate};
use futures::lock::Mutex as AsyncMutex;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::calendar::WorkCalendarPolicy;
use crate::error::EngineError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, DayEntry};
use crate::model::escalation::ScanResult;
use crate::notifier::{self, NotificationSink};
use crate::scanner::scan_employee_window;
use crate::store::{AttendanceStore, EmployeeDirectory, EscalationStateStore};
use crate::tracker;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub lookback_window_days: u32,
    pub consecutive_absence_threshold: u32,
    pub scan_concurrency: usize,
}

/// Outcome of one department scan cycle.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct ScanSummary {
    #[schema(example = 24)]
    pub employees_scanned: u32,
    /// Employees for which a new three-tier escalation fired this cycle.
    #[schema(example = 1)]
    pub escalations: u32,
}

/// One async guard per employee. Escalation state has a single writer at a
/// time: submission-triggered, manual and periodic scans all share the
/// engine and may overlap, and an unserialized read-decide-write would let
/// two cycles read the same prior state and double-notify an unchanged run.
#[derive(Default)]
struct EmployeeLocks {
    inner: Mutex<HashMap<u64, Arc<AsyncMutex<()>>>>,
}

impl EmployeeLocks {
    fn for_employee(&self, employee_id: u64) -> Arc<AsyncMutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        map.entry(employee_id).or_default().clone()
    }
}

/// Wires the attendance store, escalation state, employee directory and
/// notification sink into the submission and scan flows. "Today" is always
/// passed in by the caller rather than read from the wall clock, so every
/// flow is deterministic under test.
pub struct Engine<A, S, D, N> {
    attendance: A,
    states: S,
    directory: D,
    sink: N,
    policy: WorkCalendarPolicy,
    settings: EngineSettings,
    escalate_locks: EmployeeLocks,
}

impl<A, S, D, N> Engine<A, S, D, N>
where
    A: AttendanceStore,
    S: EscalationStateStore,
    D: EmployeeDirectory,
    N: NotificationSink,
{
    pub fn new(
        attendance: A,
        states: S,
        directory: D,
        sink: N,
        policy: WorkCalendarPolicy,
        settings: EngineSettings,
    ) -> Self {
        Self {
            attendance,
            states,
            directory,
            sink,
            policy,
            settings,
            escalate_locks: EmployeeLocks::default(),
        }
    }

    /// Accept one department's full sheet for `date` and apply it as a
    /// single atomic batch, then scan the department.
    ///
    /// The sheet must list every active employee of the department exactly
    /// once; the date must be the current day. Resubmission for the same day
    /// is a correction and fully replaces prior values.
    pub async fn submit_day_sheet(
        &self,
        department_id: u64,
        date: NaiveDate,
        today: NaiveDate,
        marked_by: u64,
        entries: &[(u64, AttendanceStatus)],
    ) -> Result<ScanSummary, EngineError> {
        if date != today {
            return Err(EngineError::validation(
                "attendance sheets must be submitted for the current day",
            ));
        }
        if entries.is_empty() {
            return Err(EngineError::validation("attendance sheet is empty"));
        }

        let active = self.directory.active_employees(department_id).await?;
        if active.is_empty() {
            return Err(EngineError::NotFound(format!(
                "department {department_id} has no active employees"
            )));
        }
        let expected: HashSet<u64> = active.iter().map(|e| e.employee_id).collect();

        let mut offenders = Vec::new();
        let mut listed = HashSet::with_capacity(entries.len());
        for &(employee_id, _) in entries {
            if !listed.insert(employee_id) || !expected.contains(&employee_id) {
                offenders.push(employee_id);
            }
        }
        for &employee_id in &expected {
            if !listed.contains(&employee_id) {
                offenders.push(employee_id);
            }
        }
        if !offenders.is_empty() {
            return Err(EngineError::validation_with_offenders(
                "attendance sheet must list every active employee of the department exactly once",
                offenders,
            ));
        }

        let rows: Vec<DayEntry> = entries
            .iter()
            .map(|&(employee_id, status)| DayEntry {
                employee_id,
                status,
                marked_by,
            })
            .collect();

        self.attendance.upsert_day(department_id, date, &rows).await?;
        info!(department_id, %date, rows = rows.len(), "attendance sheet applied");

        self.run_department_scan(department_id, today).await
    }

    /// One scan cycle for a department: read the lookback window once, scan
    /// every active employee, then evaluate escalations with bounded
    /// concurrency. One employee's failure never stops the rest; the cycle
    /// is idempotent and safe to rerun after a cancellation.
    pub async fn run_department_scan(
        &self,
        department_id: u64,
        today: NaiveDate,
    ) -> Result<ScanSummary, EngineError> {
        let employees = self.directory.active_employees(department_id).await?;
        if employees.is_empty() {
            return Err(EngineError::NotFound(format!(
                "department {department_id} has no active employees"
            )));
        }

        let window_start =
            today - Duration::days(i64::from(self.settings.lookback_window_days) - 1);
        let history = self
            .attendance
            .history(department_id, window_start, today)
            .await?;

        let mut by_employee: HashMap<u64, HashMap<NaiveDate, AttendanceStatus>> = HashMap::new();
        for record in history {
            by_employee
                .entry(record.employee_id)
                .or_default()
                .insert(record.date, record.status);
        }

        let empty = HashMap::new();
        let threshold = self.settings.consecutive_absence_threshold;
        let candidates: Vec<ScanResult> = employees
            .iter()
            .map(|e| {
                let days = by_employee.get(&e.employee_id).unwrap_or(&empty);
                scan_employee_window(e.employee_id, days, &self.policy, window_start, today)
            })
            .filter(|scan| scan.max_consecutive_absent_days >= threshold)
            .collect();

        let escalations = stream::iter(candidates)
            .map(|scan| self.escalate_employee(department_id, scan))
            .buffer_unordered(self.settings.scan_concurrency.max(1))
            .fold(0u32, |acc, fired| async move { acc + u32::from(fired) })
            .await;

        info!(
            department_id,
            %today,
            employees = employees.len(),
            escalations,
            "department scan complete"
        );

        Ok(ScanSummary {
            employees_scanned: employees.len() as u32,
            escalations,
        })
    }

    /// Periodic entry point: scan every department with active employees.
    /// Per-department failures are logged and do not stop the sweep.
    pub async fn run_all_departments(&self, today: NaiveDate) -> Result<(), EngineError> {
        for department_id in self.directory.department_ids().await? {
            if let Err(e) = self.run_department_scan(department_id, today).await {
                warn!(error = %e, department_id, "department scan failed; continuing sweep");
            }
        }
        Ok(())
    }

    pub async fn day_sheet(
        &self,
        department_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, EngineError> {
        self.attendance.day(department_id, date).await
    }

    pub async fn history(
        &self,
        department_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, EngineError> {
        if from > to {
            return Err(EngineError::validation("'from' must not be after 'to'"));
        }
        self.attendance.history(department_id, from, to).await
    }

    /// Administrative reset of a bounded historical range. Never touches
    /// the current day or anything after it, and refuses unbounded spans.
    pub async fn reset_range(
        &self,
        department_id: u64,
        from: NaiveDate,
        to: NaiveDate,
        today: NaiveDate,
    ) -> Result<u64, EngineError> {
        if from > to {
            return Err(EngineError::validation("'from' must not be after 'to'"));
        }
        if to >= today {
            return Err(EngineError::validation(
                "reset range must end before the current day",
            ));
        }
        if (to - from).num_days() > 366 {
            return Err(EngineError::validation(
                "reset range must not exceed one year",
            ));
        }
        let removed = self
            .attendance
            .delete_range(department_id, from, to)
            .await?;
        info!(department_id, %from, %to, removed, "attendance range reset");
        Ok(removed)
    }

    /// Tracker + notifier for one qualifying employee. Returns whether a new
    /// escalation fired. The whole read-decide-dispatch-persist sequence
    /// holds the employee's lock, so overlapping cycles evaluate one after
    /// the other and the second sees the advanced state. Notifications go
    /// out before the state advances; if the state write then fails, the
    /// duplicate risk is logged and accepted rather than aborting the
    /// remaining employees.
    async fn escalate_employee(&self, department_id: u64, scan: ScanResult) -> bool {
        let employee_id = scan.employee_id;
        let lock = self.escalate_locks.for_employee(employee_id);
        let _serialized = lock.lock().await;

        let prior = match self.states.state(employee_id).await {
            Ok(prior) => prior,
            Err(e) => {
                warn!(error = %e, employee_id, "escalation state read failed; skipping this cycle");
                return false;
            }
        };

        if !tracker::should_fire(&scan, prior.as_ref(), self.settings.consecutive_absence_threshold)
        {
            return false;
        }

        if let Err(e) = notifier::dispatch(&self.sink, department_id, &scan).await {
            warn!(
                error = %e,
                employee_id,
                "notification delivery failed; escalation state not advanced"
            );
            return false;
        }

        if let Some(next) = tracker::advanced_state(&scan) {
            if let Err(e) = self.states.put_state(&next).await {
                error!(
                    error = %e,
                    employee_id,
                    "escalation state update failed after dispatch; duplicate notifications possible"
                );
            }
        }

        info!(
            employee_id,
            department_id,
            consecutive_days = scan.max_consecutive_absent_days,
            "consecutive-absence escalation raised"
        );
        true
    }
}
