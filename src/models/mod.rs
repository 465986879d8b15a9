//! Shared data models spanning the aggregator and the blender.

pub mod forecast;
pub mod records;

pub use forecast::{DailyForecast, ForecastRequest, ForecastResult, WindowBounds};
pub use records::{
    is_valid_calendar_day, CategoryRecord, Checkpoint, Combination, HistoricalRecord,
    SeasonalPercentage, REFERENCE_YEAR,
};
