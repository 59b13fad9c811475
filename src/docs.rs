use crate::api::attendance::{ScanRequest, SheetRecord, SubmitSheet};
use crate::engine::ScanSummary;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance & Escalation Engine API",
        version = "1.0.0",
        description = r#"
## Attendance & Consecutive-Absence Escalation Engine

Records one attendance status per employee per day, scans rolling
lookback windows for consecutive-absence runs against the configured
work calendar, and raises tiered notifications once a run crosses the
threshold.

### Key operations
- **Bulk submission**: one department's full sheet for the current day,
  applied atomically (resubmission replaces the day).
- **History queries**: day and inclusive-range reads per department.
- **Scan trigger**: manual department scan, also run periodically.
- **Administrative reset**: clear a bounded historical range.

Caller identity is forwarded by the upstream gateway via
`X-Caller-Id` / `X-Caller-Role` / `X-Caller-Department` headers.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::submit_sheet,
        crate::api::attendance::get_day,
        crate::api::attendance::get_history,
        crate::api::attendance::trigger_scan,
        crate::api::attendance::reset_range,
    ),
    components(
        schemas(
            AttendanceStatus,
            AttendanceRecord,
            SheetRecord,
            SubmitSheet,
            ScanRequest,
            ScanSummary,
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance submission, history and escalation APIs"),
    )
)]
pub struct ApiDoc;
