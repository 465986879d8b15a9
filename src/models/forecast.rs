//! Request and response shapes of the forecast blender

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Requested date, "YYYY-MM-DD"
    pub date: String,
    pub branch: String,
    #[serde(default, alias = "move_type")]
    pub category: Option<String>,
}

impl ForecastRequest {
    pub fn new(date: impl Into<String>, branch: impl Into<String>, category: Option<&str>) -> Self {
        Self {
            date: date.into(),
            branch: branch.into(),
            category: category.map(str::to_string),
        }
    }

    /// Category with blank input treated as absent
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Inclusive date range of a forecast window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub predicted_moves: u64,
    pub comment: String,
    /// Unscoped branch forecast the blended value was derived from
    #[serde(skip)]
    pub raw_moves: u64,
    /// Seasonal percentage applied to `raw_moves`
    #[serde(skip)]
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub branch: String,
    pub category: Option<String>,
    pub forecast_window: WindowBounds,
    pub predicted_summary: Vec<DailyForecast>,
    pub total_predicted_moves: u64,
    pub average_daily_moves: u64,
    pub summary_comment: String,
}
