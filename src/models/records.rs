//! Volume records consumed by the aggregator and the percentages it produces

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Reference year used to decide whether a (month, day) pair is a real calendar day.
/// Non-leap, so February 29 never produces a row.
pub const REFERENCE_YEAR: i32 = 2021;

/// Total moves for a branch on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub date: NaiveDate,
    pub branch: String,
    pub count: Option<i64>,
}

/// Moves of one category within a branch on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub date: NaiveDate,
    pub branch: String,
    pub category: String,
    pub count: Option<i64>,
}

impl HistoricalRecord {
    pub fn new(date: NaiveDate, branch: impl Into<String>, count: Option<i64>) -> Self {
        Self {
            date,
            branch: branch.into(),
            count,
        }
    }

    pub fn month_day(&self) -> (u32, u32) {
        (self.date.month(), self.date.day())
    }
}

impl CategoryRecord {
    pub fn new(
        date: NaiveDate,
        branch: impl Into<String>,
        category: impl Into<String>,
        count: Option<i64>,
    ) -> Self {
        Self {
            date,
            branch: branch.into(),
            category: category.into(),
            count,
        }
    }

    pub fn month_day(&self) -> (u32, u32) {
        (self.date.month(), self.date.day())
    }
}

/// Historical share of a branch's daily moves attributable to one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalPercentage {
    pub branch: String,
    pub category: String,
    pub month: u32,
    pub day: u32,
    pub avg_percentage: f64,
}

/// One point of the aggregator's enumeration.
///
/// Field order is the iteration order (branch, category, month, day), so the
/// derived `Ord` matches the enumeration and a checkpoint compares directly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Combination {
    pub branch: String,
    pub category: String,
    pub month: u32,
    pub day: u32,
}

impl Combination {
    pub fn new(branch: impl Into<String>, category: impl Into<String>, month: u32, day: u32) -> Self {
        Self {
            branch: branch.into(),
            category: category.into(),
            month,
            day,
        }
    }

    /// Whether (month, day) exists in the non-leap reference year
    pub fn is_valid_calendar_day(&self) -> bool {
        is_valid_calendar_day(self.month, self.day)
    }
}

pub fn is_valid_calendar_day(month: u32, day: u32) -> bool {
    NaiveDate::from_ymd_opt(REFERENCE_YEAR, month, day).is_some()
}

/// Persisted resume position: the next combination to process, tied to the
/// year range of the run that wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub min_year: i32,
    pub max_year: i32,
    #[serde(flatten)]
    pub next: Combination,
}

impl Checkpoint {
    pub fn new(min_year: i32, max_year: i32, next: Combination) -> Self {
        Self {
            min_year,
            max_year,
            next,
        }
    }

    /// Whether a run over `min_year..=max_year` may resume from here
    pub fn covers(&self, min_year: i32, max_year: i32) -> bool {
        self.min_year == min_year && self.max_year == max_year
    }
}
