//! Unit tests for the rebuild schedule

use chrono::{Datelike, TimeZone, Timelike, Utc, Weekday};
use movecast::config::DEFAULT_REBUILD_CRON;
use movecast::core::scheduler::parse_schedule;

#[test]
fn default_schedule_is_weekly_on_sunday_morning() {
    let schedule = parse_schedule(DEFAULT_REBUILD_CRON).unwrap();
    let from = Utc.with_ymd_and_hms(2025, 6, 4, 12, 0, 0).unwrap();
    let next = schedule.after(&from).next().unwrap();

    assert_eq!(next.weekday(), Weekday::Sun);
    assert_eq!(next.hour(), 3);
    assert_eq!(next.day(), 8);
}

#[test]
fn invalid_expression_is_rejected() {
    let err = parse_schedule("every sunday").unwrap_err();
    assert!(err.to_string().contains("Invalid cron expression"));
}
