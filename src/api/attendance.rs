use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::api::AppEngine;
use crate::auth::caller::Caller;
use crate::engine::ScanSummary;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

#[derive(Deserialize, ToSchema)]
pub struct SheetRecord {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "absent")]
    pub status: AttendanceStatus,
}

#[derive(Deserialize, ToSchema)]
pub struct SubmitSheet {
    #[schema(example = 10)]
    pub department_id: u64,
    /// Must be the current day; backdated or future sheets are rejected.
    #[schema(example = "2026-08-24", format = "date", value_type = String)]
    pub date: NaiveDate,
    /// One entry per active employee of the department.
    pub records: Vec<SheetRecord>,
}

#[derive(Deserialize, IntoParams)]
pub struct DayQuery {
    pub department_id: u64,
    pub date: NaiveDate,
}

#[derive(Deserialize, IntoParams)]
pub struct HistoryQuery {
    pub department_id: u64,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct ScanRequest {
    #[schema(example = 10)]
    pub department_id: u64,
}

#[derive(Deserialize, IntoParams)]
pub struct ResetQuery {
    pub department_id: u64,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Bulk attendance submission for one department's current day.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/sheet",
    request_body = SubmitSheet,
    responses(
        (status = 200, description = "Sheet accepted, department scanned", body = Object, example = json!({
            "message": "Attendance sheet accepted",
            "employees_scanned": 24,
            "escalations": 1
        })),
        (status = 400, description = "Invalid sheet; offending employee ids listed", body = Object, example = json!({
            "message": "attendance sheet must list every active employee of the department exactly once",
            "offenders": [1003, 1017]
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown department"),
        (status = 503, description = "Storage unavailable, retry the submission")
    ),
    tag = "Attendance"
)]
pub async fn submit_sheet(
    caller: Caller,
    engine: web::Data<AppEngine>,
    payload: web::Json<SubmitSheet>,
) -> actix_web::Result<impl Responder> {
    caller.require_department(payload.department_id)?;

    let entries: Vec<(u64, AttendanceStatus)> = payload
        .records
        .iter()
        .map(|r| (r.employee_id, r.status))
        .collect();

    let today = Utc::now().date_naive();
    let summary = engine
        .submit_day_sheet(
            payload.department_id,
            payload.date,
            today,
            caller.actor_id,
            &entries,
        )
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Attendance sheet accepted",
        "employees_scanned": summary.employees_scanned,
        "escalations": summary.escalations
    })))
}

/// Stored records for a single day.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/day",
    params(DayQuery),
    responses(
        (status = 200, description = "Records for the day, empty if none submitted", body = [AttendanceRecord]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 503, description = "Storage unavailable")
    ),
    tag = "Attendance"
)]
pub async fn get_day(
    caller: Caller,
    engine: web::Data<AppEngine>,
    query: web::Query<DayQuery>,
) -> actix_web::Result<impl Responder> {
    caller.require_department(query.department_id)?;
    let records = engine.day_sheet(query.department_id, query.date).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Inclusive date-range history, used by the scanner and reporting UIs.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Records in the range", body = [AttendanceRecord]),
        (status = 400, description = "Invalid range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 503, description = "Storage unavailable")
    ),
    tag = "Attendance"
)]
pub async fn get_history(
    caller: Caller,
    engine: web::Data<AppEngine>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    caller.require_department(query.department_id)?;
    let records = engine
        .history(query.department_id, query.from, query.to)
        .await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Manual scan trigger for one department (HR/Admin).
#[utoipa::path(
    post,
    path = "/api/v1/attendance/scan",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Scan completed", body = ScanSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown department"),
        (status = 503, description = "Storage unavailable")
    ),
    tag = "Attendance"
)]
pub async fn trigger_scan(
    caller: Caller,
    engine: web::Data<AppEngine>,
    payload: web::Json<ScanRequest>,
) -> actix_web::Result<impl Responder> {
    caller.require_hr_or_admin()?;
    let today = Utc::now().date_naive();
    let summary = engine
        .run_department_scan(payload.department_id, today)
        .await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Administrative reset: clear a bounded historical range (Admin only).
#[utoipa::path(
    delete,
    path = "/api/v1/attendance/range",
    params(ResetQuery),
    responses(
        (status = 200, description = "Range cleared", body = Object, example = json!({
            "message": "Attendance range cleared",
            "removed": 120
        })),
        (status = 400, description = "Range not historical or not bounded"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 503, description = "Storage unavailable")
    ),
    tag = "Attendance"
)]
pub async fn reset_range(
    caller: Caller,
    engine: web::Data<AppEngine>,
    query: web::Query<ResetQuery>,
) -> actix_web::Result<impl Responder> {
    caller.require_admin()?;
    let today = Utc::now().date_naive();
    let removed = engine
        .reset_range(query.department_id, query.from, query.to, today)
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Attendance range cleared",
        "removed": removed
    })))
}
