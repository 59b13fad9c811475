use crate::calendar::WorkCalendarMode;
use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,

    pub lookback_window_days: u32,
    pub consecutive_absence_threshold: u32,
    pub work_calendar_mode: WorkCalendarMode,
    pub scan_interval_secs: u64,
    pub scan_concurrency: usize,

    // Rate limiting
    pub rate_submit_per_min: u32,
    pub rate_query_per_min: u32,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),

            lookback_window_days: env::var("LOOKBACK_WINDOW_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            consecutive_absence_threshold: env::var("CONSECUTIVE_ABSENCE_THRESHOLD")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap(),
            work_calendar_mode: env::var("WORK_CALENDAR_MODE")
                .unwrap_or_else(|_| "work-days-only".to_string())
                .parse()
                .unwrap(),
            scan_interval_secs: env::var("SCAN_INTERVAL_SECS")
                .unwrap_or_else(|_| "86400".to_string()) // default once daily
                .parse()
                .unwrap(),
            scan_concurrency: env::var("SCAN_CONCURRENCY")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .unwrap(),

            rate_submit_per_min: env::var("RATE_SUBMIT_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_query_per_min: env::var("RATE_QUERY_PER_MIN")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
        }
    }
}
