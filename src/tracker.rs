use crate::model::escalation::{EscalationState, ScanResult};

/// Decide whether a freshly computed scan must produce a new escalation,
/// given the last run that was already notified for this employee.
///
/// Fires when the run meets the threshold and is genuinely new information:
/// no prior state, a run ending later than the one already notified, or the
/// same run grown longer at the same end date (a backfilled correction).
/// An unchanged run never re-fires, however many times it is rescanned.
pub fn should_fire(
    scan: &ScanResult,
    prior: Option<&EscalationState>,
    threshold: u32,
) -> bool {
    if scan.max_consecutive_absent_days < threshold {
        return false;
    }
    let Some(run_end) = scan.last_absent_date_of_run else {
        return false;
    };
    match prior {
        None => true,
        Some(state) => {
            run_end > state.last_notified_run_end_date
                || (run_end == state.last_notified_run_end_date
                    && scan.max_consecutive_absent_days > state.last_notified_run_length)
        }
    }
}

/// The state to persist once the notifications for `scan` have been handed
/// off. Callers must only invoke this for a scan that passed `should_fire`,
/// which guarantees the run end date exists.
pub fn advanced_state(scan: &ScanResult) -> Option<EscalationState> {
    scan.last_absent_date_of_run.map(|run_end| EscalationState {
        employee_id: scan.employee_id,
        last_notified_run_end_date: run_end,
        last_notified_run_length: scan.max_consecutive_absent_days,
    })
}
