//! Storage contracts and their PostgreSQL / in-memory implementations

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::error::Result;
use crate::models::{CategoryRecord, HistoricalRecord, SeasonalPercentage};
use async_trait::async_trait;

/// Read side of the multi-year volume tables
#[async_trait]
pub trait VolumeSource: Send + Sync {
    /// Branch totals whose calendar year lies in `[min_year, max_year]`
    async fn load_totals(&self, min_year: i32, max_year: i32) -> Result<Vec<HistoricalRecord>>;

    /// Category volumes whose calendar year lies in `[min_year, max_year]`
    async fn load_categories(&self, min_year: i32, max_year: i32)
        -> Result<Vec<CategoryRecord>>;
}

/// The seasonal percentage table
#[async_trait]
pub trait PercentageStore: Send + Sync {
    /// Insert or overwrite every row in one transaction, keyed by
    /// (branch, category, month, day). Returns the number of rows written.
    async fn upsert_percentages(&self, rows: &[SeasonalPercentage]) -> Result<u64>;

    async fn exact_percentage(
        &self,
        branch: &str,
        category: &str,
        month: u32,
        day: u32,
    ) -> Result<Option<f64>>;

    /// Mean of all rows for the month, `None` when the month has no rows
    async fn monthly_average(&self, branch: &str, category: &str, month: u32)
        -> Result<Option<f64>>;

    /// Distinct branches with seasonal data, ascending
    async fn branches(&self) -> Result<Vec<String>>;

    /// Distinct categories with seasonal data, ascending
    async fn categories(&self) -> Result<Vec<String>>;
}
