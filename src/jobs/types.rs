//! Job types for the rebuild workflow

use serde::{Deserialize, Serialize};

/// Recompute the seasonal percentage table from the given year range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildPercentagesJob {
    pub min_year: i32,
    pub max_year: i32,
}

impl RebuildPercentagesJob {
    pub fn new(min_year: i32, max_year: i32) -> Self {
        Self { min_year, max_year }
    }
}
