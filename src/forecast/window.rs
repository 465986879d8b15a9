//! Output window selection

use crate::models::WindowBounds;
use chrono::{Duration, NaiveDate};

/// Requests at most this many days ahead are anchored on today
pub const NEAR_TERM_DAYS: i64 = 7;
/// Days either side of a far-future request date
pub const HALF_WINDOW_DAYS: i64 = 7;
pub const WINDOW_DAYS: i64 = 15;

/// Pick the 15-day window for a request.
///
/// Near-term requests (including past dates) get `[today, today + 14]`,
/// anything later gets `[date - 7, date + 7]`. The end never passes `horizon`.
pub fn select_window(requested: NaiveDate, today: NaiveDate, horizon: NaiveDate) -> WindowBounds {
    let days_from_today = (requested - today).num_days();
    let (start, end) = if days_from_today <= NEAR_TERM_DAYS {
        (today, today + Duration::days(WINDOW_DAYS - 1))
    } else {
        (
            requested - Duration::days(HALF_WINDOW_DAYS),
            requested + Duration::days(HALF_WINDOW_DAYS),
        )
    };

    WindowBounds {
        start,
        end: end.min(horizon),
    }
}

impl WindowBounds {
    /// Every calendar date in the window, inclusive
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|d| *d <= self.end)
            .collect()
    }

    /// Dates that are reported: the window minus anything before today
    pub fn emitted_dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        self.dates().into_iter().filter(|d| *d >= today).collect()
    }
}
