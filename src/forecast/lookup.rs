//! Seasonal percentage lookup with tiered fallback
//!
//! Two chains share the first two tiers (exact day, then monthly mean) and
//! differ only in the last resort: blending uses the configured floor,
//! commentary uses the requested date's own percentage.

use crate::db::PercentageStore;
use crate::error::Result;
use tracing::{debug, warn};

/// Which tier produced a percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentageSource {
    ExactDay,
    MonthlyAverage,
    Fallback,
}

pub async fn stored_percentage(
    store: &dyn PercentageStore,
    branch: &str,
    category: &str,
    month: u32,
    day: u32,
) -> Result<Option<(f64, PercentageSource)>> {
    if let Some(value) = store.exact_percentage(branch, category, month, day).await? {
        debug!(branch, category, month, day, percentage = value, "Found day-specific percentage");
        return Ok(Some((value, PercentageSource::ExactDay)));
    }
    if let Some(value) = store.monthly_average(branch, category, month).await? {
        debug!(branch, category, month, percentage = value, "Using monthly average percentage");
        return Ok(Some((value, PercentageSource::MonthlyAverage)));
    }
    Ok(None)
}

/// Exact day, then monthly mean, then `floor`
pub async fn percentage_or_floor(
    store: &dyn PercentageStore,
    branch: &str,
    category: &str,
    month: u32,
    day: u32,
    floor: f64,
) -> Result<f64> {
    match stored_percentage(store, branch, category, month, day).await? {
        Some((value, _)) => Ok(value),
        None => {
            warn!(
                branch,
                category,
                month,
                floor,
                "No percentage data, using minimal percentage"
            );
            Ok(floor)
        }
    }
}

/// Exact day, then monthly mean, then `requested_date_percentage`
pub async fn commentary_percentage(
    store: &dyn PercentageStore,
    branch: &str,
    category: &str,
    month: u32,
    day: u32,
    requested_date_percentage: f64,
) -> Result<f64> {
    Ok(stored_percentage(store, branch, category, month, day)
        .await?
        .map(|(value, _)| value)
        .unwrap_or(requested_date_percentage))
}
