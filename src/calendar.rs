use chrono::{Datelike, NaiveDate, Weekday};
use strum_macros::{Display, EnumString};

/// Deployment-wide switch for which calendar days count toward the absence
/// window. Not per-employee state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum WorkCalendarMode {
    /// Saturday and Sunday are skipped entirely.
    WorkDaysOnly,
    /// Every calendar day counts.
    AllDays,
}

#[derive(Debug, Clone, Copy)]
pub struct WorkCalendarPolicy {
    mode: WorkCalendarMode,
}

impl WorkCalendarPolicy {
    pub fn new(mode: WorkCalendarMode) -> Self {
        Self { mode }
    }

    /// Whether `date` is part of the absence-tracking window. Non-countable
    /// days neither break nor extend a run.
    pub fn is_countable_day(&self, date: NaiveDate) -> bool {
        match self.mode {
            WorkCalendarMode::AllDays => true,
            WorkCalendarMode::WorkDaysOnly => {
                !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn work_days_only_skips_weekends() {
        let policy = WorkCalendarPolicy::new(WorkCalendarMode::WorkDaysOnly);
        // 2026-08-21 is a Friday.
        assert!(policy.is_countable_day(d(2026, 8, 21)));
        assert!(!policy.is_countable_day(d(2026, 8, 22)));
        assert!(!policy.is_countable_day(d(2026, 8, 23)));
        assert!(policy.is_countable_day(d(2026, 8, 24)));
    }

    #[test]
    fn all_days_counts_weekends() {
        let policy = WorkCalendarPolicy::new(WorkCalendarMode::AllDays);
        assert!(policy.is_countable_day(d(2026, 8, 22)));
        assert!(policy.is_countable_day(d(2026, 8, 23)));
    }

    #[test]
    fn mode_parses_from_config_string() {
        assert_eq!(
            "work-days-only".parse::<WorkCalendarMode>().unwrap(),
            WorkCalendarMode::WorkDaysOnly
        );
        assert_eq!(
            "all-days".parse::<WorkCalendarMode>().unwrap(),
            WorkCalendarMode::AllDays
        );
        assert!("holidays".parse::<WorkCalendarMode>().is_err());
    }
}
