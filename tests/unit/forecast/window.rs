//! Unit tests for window selection

use crate::fixtures::date;
use movecast::forecast::select_window;

#[test]
fn near_term_request_is_anchored_on_today() {
    let today = date(2025, 6, 1);
    let window = select_window(date(2025, 6, 8), today, date(2025, 12, 31));
    assert_eq!(window.start, today);
    assert_eq!(window.end, date(2025, 6, 15));
    assert_eq!(window.dates().len(), 15);
}

#[test]
fn eight_days_out_is_centred_on_the_date() {
    let today = date(2025, 6, 1);
    let window = select_window(date(2025, 6, 9), today, date(2025, 12, 31));
    assert_eq!(window.start, date(2025, 6, 2));
    assert_eq!(window.end, date(2025, 6, 16));
}

#[test]
fn past_dates_use_the_near_term_window() {
    let today = date(2025, 6, 1);
    let window = select_window(date(2025, 1, 15), today, date(2025, 12, 31));
    assert_eq!(window.start, today);
    assert_eq!(window.end, date(2025, 6, 15));
}

#[test]
fn end_is_clamped_to_horizon() {
    let today = date(2025, 6, 1);
    let window = select_window(date(2025, 12, 28), today, date(2025, 12, 31));
    assert_eq!(window.start, date(2025, 12, 21));
    assert_eq!(window.end, date(2025, 12, 31));
    assert_eq!(window.dates().len(), 11);
}

#[test]
fn emitted_dates_drop_days_before_today() {
    let today = date(2025, 6, 10);
    let window = select_window(date(2025, 6, 18), today, date(2025, 12, 31));
    // Window is [06-11, 06-25] so nothing is dropped
    assert_eq!(window.emitted_dates(today).len(), 15);

    let later_today = date(2025, 6, 14);
    let emitted = window.emitted_dates(later_today);
    assert_eq!(emitted.first(), Some(&later_today));
    assert_eq!(emitted.len(), 12);
}

#[test]
fn window_spanning_year_end_is_clamped() {
    let today = date(2025, 12, 25);
    let window = select_window(date(2025, 12, 26), today, date(2025, 12, 31));
    assert_eq!(window.start, today);
    assert_eq!(window.end, date(2025, 12, 31));
    assert_eq!(window.emitted_dates(today).len(), 7);
}
