//! Shared volume and percentage fixtures

#![allow(dead_code)]

use chrono::NaiveDate;
use movecast::aggregator::MemoryCheckpointStore;
use movecast::config::{AggregatorConfig, ForecastConfig};
use movecast::db::MemoryStore;
use movecast::forecast::Predictor;
use movecast::models::{CategoryRecord, Checkpoint, Combination, HistoricalRecord, SeasonalPercentage};
use std::path::PathBuf;
use std::time::Duration;

pub const LOCAL: &str = "Local";
pub const LONG_DISTANCE: &str = "Long Distance";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Branch totals for 2020..=2023. The 2020 rows fall outside the default range.
pub fn totals() -> Vec<HistoricalRecord> {
    vec![
        HistoricalRecord::new(date(2020, 1, 5), "Dallas", Some(1000)),
        HistoricalRecord::new(date(2022, 1, 5), "Dallas", Some(10)),
        HistoricalRecord::new(date(2023, 1, 5), "Dallas", Some(30)),
        HistoricalRecord::new(date(2022, 2, 28), "Dallas", Some(20)),
        HistoricalRecord::new(date(2023, 3, 1), "Austin", Some(8)),
    ]
}

/// Category volumes. Dallas/Local on 2022-01-05 has one null row.
pub fn categories() -> Vec<CategoryRecord> {
    vec![
        CategoryRecord::new(date(2020, 1, 5), "Dallas", LOCAL, Some(999)),
        CategoryRecord::new(date(2022, 1, 5), "Dallas", LOCAL, Some(4)),
        CategoryRecord::new(date(2022, 1, 5), "Dallas", LOCAL, None),
        CategoryRecord::new(date(2023, 1, 5), "Dallas", LOCAL, Some(6)),
        CategoryRecord::new(date(2022, 1, 5), "Dallas", LONG_DISTANCE, Some(2)),
        CategoryRecord::new(date(2022, 2, 28), "Dallas", LOCAL, Some(5)),
        CategoryRecord::new(date(2022, 2, 28), "Dallas", LONG_DISTANCE, Some(15)),
        CategoryRecord::new(date(2023, 3, 1), "Austin", LOCAL, Some(2)),
    ]
}

pub fn volume_store() -> MemoryStore {
    MemoryStore::new()
        .with_totals(totals())
        .with_categories(categories())
}

pub fn aggregator_config(batch_size: usize, store_retries: usize) -> AggregatorConfig {
    AggregatorConfig {
        min_year: 2021,
        max_year: 2024,
        batch_size,
        checkpoint_path: PathBuf::from("unused.json"),
        store_retries,
        retry_delay: Duration::from_millis(1),
    }
}

pub fn checkpoints() -> MemoryCheckpointStore {
    MemoryCheckpointStore::new()
}

/// Resume position for a run over the default 2021..=2024 range
pub fn checkpoint_at(branch: &str, category: &str, month: u32, day: u32) -> Checkpoint {
    Checkpoint::new(2021, 2024, Combination::new(branch, category, month, day))
}

pub fn row(branch: &str, category: &str, month: u32, day: u32, pct: f64) -> SeasonalPercentage {
    SeasonalPercentage {
        branch: branch.to_string(),
        category: category.to_string(),
        month,
        day,
        avg_percentage: pct,
    }
}

/// June percentages for Dallas/Local: 25% on every day
pub fn june_local_rows() -> Vec<SeasonalPercentage> {
    (1..=30).map(|d| row("Dallas", LOCAL, 6, d, 25.0)).collect()
}

pub fn forecast_config() -> ForecastConfig {
    ForecastConfig {
        horizon: date(2025, 12, 31),
        floor_percentage: 1.0,
        model_dir: PathBuf::from("models"),
    }
}

/// Predicts the same raw volume for every date
pub struct ConstantPredictor(pub f64);

impl Predictor for ConstantPredictor {
    fn predict(&self, dates: &[NaiveDate]) -> Vec<(NaiveDate, f64)> {
        dates.iter().map(|&d| (d, self.0)).collect()
    }
}
