use uuid::Uuid;

use crate::error::EngineError;
use crate::model::escalation::{NotificationRequest, RecipientRole, ScanResult, Severity};

/// Outbound edge to the external notification service. Implementations must
/// not retry; at-least-once delivery is the consumer's concern.
#[allow(async_fn_in_trait)]
pub trait NotificationSink {
    async fn submit(&self, request: &NotificationRequest) -> Result<(), EngineError>;
}

/// The three escalation tiers for one qualifying employee, fixed severities:
/// informational to the employee, elevated to the department head, critical
/// to the admin role.
pub fn build_requests(department_id: u64, scan: &ScanResult) -> Vec<NotificationRequest> {
    let days = scan.max_consecutive_absent_days;
    let anchor = scan
        .last_absent_date_of_run
        .map(|d| d.to_string())
        .unwrap_or_default();

    let tiers = [
        (
            RecipientRole::Employee,
            Severity::Info,
            format!(
                "You have been marked absent for {days} consecutive work days \
                 (through {anchor}). Please contact HR."
            ),
        ),
        (
            RecipientRole::DepartmentHead,
            Severity::Elevated,
            format!(
                "Employee {} has {days} consecutive absences through {anchor}.",
                scan.employee_id
            ),
        ),
        (
            RecipientRole::Admin,
            Severity::Critical,
            format!(
                "Employee {} in department {department_id} has {days} consecutive \
                 absences through {anchor}.",
                scan.employee_id
            ),
        ),
    ];

    tiers
        .into_iter()
        .map(|(recipient_role, severity, message)| NotificationRequest {
            dedupe_key: Uuid::new_v4(),
            recipient_role,
            employee_id: scan.employee_id,
            department_id,
            severity,
            message,
        })
        .collect()
}

/// Hand all three tiers to the sink. Fails fast on the first rejected
/// payload; the caller then leaves the escalation state untouched so the
/// next cycle retries.
pub async fn dispatch<N: NotificationSink>(
    sink: &N,
    department_id: u64,
    scan: &ScanResult,
) -> Result<(), EngineError> {
    for request in build_requests(department_id, scan) {
        sink.submit(&request).await?;
    }
    Ok(())
}
