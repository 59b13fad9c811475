use std::collections::HashMap;

use chrono::NaiveDate;

use crate::calendar::WorkCalendarPolicy;
use crate::model::attendance::AttendanceStatus;
use crate::model::escalation::ScanResult;

/// Scan one employee's lookback window for the unresolved consecutive-absence
/// run and the window-wide absence total.
///
/// Walks countable days from `today` backward to `window_start` (inclusive).
/// Non-countable days are skipped without breaking the run. A countable day
/// with no submitted record counts as Absent: missing a submission must not
/// mask true absenteeism. The run stops at the first countable day marked
/// Present, Late or Excused, so a streak that was broken and then resumed is
/// reported at its new length, never the sum across the break.
///
/// Pure function of its inputs; safe to run per employee concurrently.
pub fn scan_employee_window(
    employee_id: u64,
    by_date: &HashMap<NaiveDate, AttendanceStatus>,
    policy: &WorkCalendarPolicy,
    window_start: NaiveDate,
    today: NaiveDate,
) -> ScanResult {
    let mut run_length = 0u32;
    let mut run_end: Option<NaiveDate> = None;
    let mut run_open = true;
    let mut total_absences = 0u32;

    let mut day = today;
    loop {
        if policy.is_countable_day(day) {
            let status = by_date
                .get(&day)
                .copied()
                .unwrap_or(AttendanceStatus::Absent);

            if status.is_absent() {
                total_absences += 1;
                if run_open {
                    run_length += 1;
                    if run_end.is_none() {
                        run_end = Some(day);
                    }
                }
            } else {
                run_open = false;
            }
        }

        if day <= window_start {
            break;
        }
        let Some(prev) = day.pred_opt() else { break };
        day = prev;
    }

    ScanResult {
        employee_id,
        max_consecutive_absent_days: run_length,
        last_absent_date_of_run: run_end,
        total_absences_in_window: total_absences,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WorkCalendarMode;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn work_days() -> WorkCalendarPolicy {
        WorkCalendarPolicy::new(WorkCalendarMode::WorkDaysOnly)
    }

    // 2026-08-03 is a Monday; 03..07 are Mon..Fri.
    const Y: i32 = 2026;

    fn week1(status: AttendanceStatus) -> HashMap<NaiveDate, AttendanceStatus> {
        (3..=7).map(|day| (d(Y, 8, day), status)).collect()
    }

    #[test]
    fn five_day_run_is_detected() {
        let by_date = week1(AttendanceStatus::Absent);
        let scan =
            scan_employee_window(1, &by_date, &work_days(), d(Y, 8, 3), d(Y, 8, 7));
        assert_eq!(scan.max_consecutive_absent_days, 5);
        assert_eq!(scan.last_absent_date_of_run, Some(d(Y, 8, 7)));
        assert_eq!(scan.total_absences_in_window, 5);
    }

    #[test]
    fn present_day_resolves_the_run() {
        // Absent Mon-Fri, present the following Monday; scan on that Monday.
        let mut by_date = week1(AttendanceStatus::Absent);
        by_date.insert(d(Y, 8, 10), AttendanceStatus::Present);
        let scan =
            scan_employee_window(1, &by_date, &work_days(), d(Y, 8, 3), d(Y, 8, 10));
        assert_eq!(scan.max_consecutive_absent_days, 0);
        assert_eq!(scan.last_absent_date_of_run, None);
        assert_eq!(scan.total_absences_in_window, 5);
    }

    #[test]
    fn new_run_after_break_is_not_summed_with_the_old_one() {
        // 5 absent, 1 present, then 3 absent: the unresolved run is 3, not 8
        // and not the historical 5.
        let mut by_date = week1(AttendanceStatus::Absent);
        by_date.insert(d(Y, 8, 10), AttendanceStatus::Present);
        for day in 11..=13 {
            by_date.insert(d(Y, 8, day), AttendanceStatus::Absent);
        }
        let scan =
            scan_employee_window(1, &by_date, &work_days(), d(Y, 8, 3), d(Y, 8, 13));
        assert_eq!(scan.max_consecutive_absent_days, 3);
        assert_eq!(scan.last_absent_date_of_run, Some(d(Y, 8, 13)));
        assert_eq!(scan.total_absences_in_window, 8);
    }

    #[test]
    fn single_present_resets_even_if_absence_resumes_immediately() {
        let mut by_date: HashMap<_, _> = (3..=7)
            .map(|day| (d(Y, 8, day), AttendanceStatus::Absent))
            .collect();
        by_date.insert(d(Y, 8, 5), AttendanceStatus::Present);
        let scan =
            scan_employee_window(1, &by_date, &work_days(), d(Y, 8, 3), d(Y, 8, 7));
        assert_eq!(scan.max_consecutive_absent_days, 2);
        assert_eq!(scan.total_absences_in_window, 4);
    }

    #[test]
    fn weekend_absences_do_not_form_a_run_in_work_days_mode() {
        // Mon 03 .. Sun 09: five work-day presents, weekend absences.
        let mut by_date = week1(AttendanceStatus::Present);
        by_date.insert(d(Y, 8, 8), AttendanceStatus::Absent);
        by_date.insert(d(Y, 8, 9), AttendanceStatus::Absent);
        let scan =
            scan_employee_window(1, &by_date, &work_days(), d(Y, 8, 3), d(Y, 8, 9));
        assert_eq!(scan.max_consecutive_absent_days, 0);
        assert_eq!(scan.total_absences_in_window, 0);
    }

    #[test]
    fn weekend_gap_does_not_break_a_run() {
        // Absent Thu 06, Fri 07, Mon 10: weekend in between is skipped.
        let by_date: HashMap<_, _> = [d(Y, 8, 6), d(Y, 8, 7), d(Y, 8, 10)]
            .into_iter()
            .map(|date| (date, AttendanceStatus::Absent))
            .collect();
        let scan =
            scan_employee_window(1, &by_date, &work_days(), d(Y, 8, 6), d(Y, 8, 10));
        assert_eq!(scan.max_consecutive_absent_days, 3);
        assert_eq!(scan.last_absent_date_of_run, Some(d(Y, 8, 10)));
    }

    #[test]
    fn missing_days_count_as_absent() {
        // Records only for Mon and Tue; Wed-Fri were never submitted.
        let by_date: HashMap<_, _> = [
            (d(Y, 8, 3), AttendanceStatus::Present),
            (d(Y, 8, 4), AttendanceStatus::Present),
        ]
        .into_iter()
        .collect();
        let scan =
            scan_employee_window(1, &by_date, &work_days(), d(Y, 8, 3), d(Y, 8, 7));
        assert_eq!(scan.max_consecutive_absent_days, 3);
        assert_eq!(scan.total_absences_in_window, 3);
    }

    #[test]
    fn empty_window_yields_all_countable_days_absent() {
        let by_date = HashMap::new();
        // Mon 03 .. Fri 14: ten work days, two weekend days skipped.
        let scan =
            scan_employee_window(1, &by_date, &work_days(), d(Y, 8, 3), d(Y, 8, 14));
        assert_eq!(scan.max_consecutive_absent_days, 10);
        assert_eq!(scan.total_absences_in_window, 10);
        assert_eq!(scan.last_absent_date_of_run, Some(d(Y, 8, 14)));
    }

    #[test]
    fn late_and_excused_break_the_run_without_counting_as_absence() {
        let by_date: HashMap<_, _> = [
            (d(Y, 8, 4), AttendanceStatus::Late),
            (d(Y, 8, 5), AttendanceStatus::Absent),
            (d(Y, 8, 6), AttendanceStatus::Excused),
            (d(Y, 8, 7), AttendanceStatus::Absent),
        ]
        .into_iter()
        .collect();
        let scan =
            scan_employee_window(1, &by_date, &work_days(), d(Y, 8, 4), d(Y, 8, 7));
        assert_eq!(scan.max_consecutive_absent_days, 1);
        assert_eq!(scan.last_absent_date_of_run, Some(d(Y, 8, 7)));
        assert_eq!(scan.total_absences_in_window, 2);
    }
}
