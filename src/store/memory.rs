//! In-memory doubles backing the engine-level tests. Mutex-guarded maps,
//! with switchable failure injection for the atomicity and retry paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;

use crate::error::EngineError;
use crate::model::attendance::{AttendanceRecord, DayEntry};
use crate::model::employee::ActiveEmployee;
use crate::model::escalation::{EscalationState, NotificationRequest};
use crate::notifier::NotificationSink;
use crate::store::{AttendanceStore, EmployeeDirectory, EscalationStateStore};

fn unavailable() -> EngineError {
    EngineError::Repository(sqlx::Error::PoolTimedOut)
}

#[derive(Default)]
pub struct MemoryAttendanceStore {
    rows: Mutex<BTreeMap<(u64, NaiveDate), AttendanceRecord>>,
    fail_writes: AtomicBool,
}

impl MemoryAttendanceStore {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn record_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn status_of(&self, employee_id: u64, date: NaiveDate) -> Option<AttendanceRecord> {
        self.rows.lock().unwrap().get(&(employee_id, date)).cloned()
    }
}

impl AttendanceStore for MemoryAttendanceStore {
    async fn upsert_day(
        &self,
        department_id: u64,
        date: NaiveDate,
        rows: &[DayEntry],
    ) -> Result<(), EngineError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut map = self.rows.lock().unwrap();
        for row in rows {
            map.insert(
                (row.employee_id, date),
                AttendanceRecord {
                    employee_id: row.employee_id,
                    date,
                    status: row.status,
                    department_id,
                    marked_by: row.marked_by,
                },
            );
        }
        Ok(())
    }

    async fn day(
        &self,
        department_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, EngineError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.department_id == department_id && r.date == date)
            .cloned()
            .collect())
    }

    async fn history(
        &self,
        department_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, EngineError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.department_id == department_id && r.date >= from && r.date <= to)
            .cloned()
            .collect())
    }

    async fn delete_range(
        &self,
        department_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<u64, EngineError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut map = self.rows.lock().unwrap();
        let before = map.len();
        map.retain(|_, r| {
            !(r.department_id == department_id && r.date >= from && r.date <= to)
        });
        Ok((before - map.len()) as u64)
    }
}

#[derive(Default)]
pub struct MemoryEscalationStateStore {
    states: Mutex<HashMap<u64, EscalationState>>,
    fail_puts: AtomicBool,
}

impl MemoryEscalationStateStore {
    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn state_of(&self, employee_id: u64) -> Option<EscalationState> {
        self.states.lock().unwrap().get(&employee_id).cloned()
    }
}

impl EscalationStateStore for MemoryEscalationStateStore {
    async fn state(&self, employee_id: u64) -> Result<Option<EscalationState>, EngineError> {
        Ok(self.states.lock().unwrap().get(&employee_id).cloned())
    }

    async fn put_state(&self, state: &EscalationState) -> Result<(), EngineError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(EngineError::StatePersistence("injected failure".into()));
        }
        self.states
            .lock()
            .unwrap()
            .insert(state.employee_id, state.clone());
        Ok(())
    }
}

pub struct MemoryDirectory {
    employees: Vec<ActiveEmployee>,
}

impl MemoryDirectory {
    pub fn new(pairs: &[(u64, u64)]) -> Self {
        Self {
            employees: pairs
                .iter()
                .map(|&(employee_id, department_id)| ActiveEmployee {
                    employee_id,
                    department_id,
                })
                .collect(),
        }
    }
}

impl EmployeeDirectory for MemoryDirectory {
    async fn active_employees(
        &self,
        department_id: u64,
    ) -> Result<Vec<ActiveEmployee>, EngineError> {
        Ok(self
            .employees
            .iter()
            .filter(|e| e.department_id == department_id)
            .cloned()
            .collect())
    }

    async fn department_ids(&self) -> Result<Vec<u64>, EngineError> {
        let mut ids: Vec<u64> = self.employees.iter().map(|e| e.department_id).collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}

#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<NotificationRequest>>,
    fail_submits: AtomicBool,
    yield_on_submit: AtomicBool,
}

impl RecordingSink {
    pub fn fail_submits(&self, fail: bool) {
        self.fail_submits.store(fail, Ordering::SeqCst);
    }

    /// Suspend once per delivery, giving concurrently running cycles a
    /// chance to interleave mid-dispatch.
    pub fn yield_on_submit(&self, enable: bool) {
        self.yield_on_submit.store(enable, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<NotificationRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    async fn submit(&self, request: &NotificationRequest) -> Result<(), EngineError> {
        if self.fail_submits.load(Ordering::SeqCst) {
            return Err(EngineError::NotificationDelivery("injected failure".into()));
        }
        if self.yield_on_submit.load(Ordering::SeqCst) {
            actix_web::rt::task::yield_now().await;
        }
        self.sent.lock().unwrap().push(request.clone());
        Ok(())
    }
}
