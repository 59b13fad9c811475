use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Daily attendance outcome, stored lowercase in the database.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    /// Only a plain `absent` extends a consecutive-absence run.
    pub fn is_absent(&self) -> bool {
        matches!(self, AttendanceStatus::Absent)
    }
}

/// One employee's stored attendance for a single calendar day.
///
/// At most one record exists per `(employee_id, date)`; a resubmission for the
/// same day replaces the prior value, it never creates a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2026-08-24", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "absent")]
    pub status: AttendanceStatus,
    #[schema(example = 10)]
    pub department_id: u64,
    #[schema(example = 7)]
    pub marked_by: u64,
}

/// Input row for a day's batch write, after validation.
#[derive(Debug, Clone)]
pub struct DayEntry {
    pub employee_id: u64,
    pub status: AttendanceStatus,
    pub marked_by: u64,
}
