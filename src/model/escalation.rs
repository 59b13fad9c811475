use chrono::NaiveDate;
use serde::Serialize;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-employee record of the last consecutive-absence run that was already
/// notified. Prevents the same unresolved run from re-alerting on every scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationState {
    pub employee_id: u64,
    /// Newest absent date of the run at the time the notification fired.
    pub last_notified_run_end_date: NaiveDate,
    /// Run length at notification time.
    pub last_notified_run_length: u32,
}

/// Result of scanning one employee's lookback window. Ephemeral; recomputed
/// on every trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub employee_id: u64,
    /// Length of the unresolved absence run anchored at the most recent
    /// countable day. Zero when that day is Present/Late/Excused.
    pub max_consecutive_absent_days: u32,
    /// Newest absent date of that run; `None` when there is no run.
    pub last_absent_date_of_run: Option<NaiveDate>,
    /// Absences across the whole window, counted independently of run breaks.
    pub total_absences_in_window: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecipientRole {
    Employee,
    DepartmentHead,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Elevated,
    Critical,
}

/// Notification payload handed to the external notification service.
/// Persistence, read tracking and delivery channels are its concern, not ours.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationRequest {
    pub dedupe_key: Uuid,
    pub recipient_role: RecipientRole,
    pub employee_id: u64,
    pub department_id: u64,
    pub severity: Severity,
    pub message: String,
}
