//! Category forecast = raw branch forecast x seasonal percentage

use crate::config::ForecastConfig;
use crate::db::PercentageStore;
use crate::error::{MovecastError, Result};
use crate::forecast::clock::Clock;
use crate::forecast::lookup::{commentary_percentage, percentage_or_floor};
use crate::forecast::narrative::{
    day_comment, no_category_summary, summary_comment, PhrasePicker, NO_CATEGORY_NOTICE,
};
use crate::forecast::predictor::PredictorRegistry;
use crate::forecast::window::select_window;
use crate::models::{DailyForecast, ForecastRequest, ForecastResult};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Volumes are never negative or fractional. Ties round to even. NaN maps to
/// 0 and anything past `u64::MAX` saturates.
pub fn clip_and_round(value: f64) -> u64 {
    value.max(0.0).round_ties_even() as u64
}

/// `round(raw * percentage / 100)`
pub fn blend(raw: u64, percentage: f64) -> u64 {
    clip_and_round(raw as f64 * percentage / 100.0)
}

/// `100 * part / whole`, 0 when `whole` is 0
pub fn share_percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

pub struct ForecastBlender {
    store: Arc<dyn PercentageStore>,
    predictors: Arc<PredictorRegistry>,
    clock: Arc<dyn Clock>,
    picker: Arc<dyn PhrasePicker>,
    config: ForecastConfig,
}

impl ForecastBlender {
    pub fn new(
        store: Arc<dyn PercentageStore>,
        predictors: Arc<PredictorRegistry>,
        clock: Arc<dyn Clock>,
        picker: Arc<dyn PhrasePicker>,
        config: ForecastConfig,
    ) -> Self {
        Self {
            store,
            predictors,
            clock,
            picker,
            config,
        }
    }

    pub async fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResult> {
        let requested = self.validate_date(&request.date)?;
        let branch = request.branch.as_str();
        let category = request.category();
        self.validate_branch(branch).await?;
        if let Some(category) = category {
            self.validate_category(category).await?;
        }

        let predictor = self
            .predictors
            .get(branch)
            .ok_or_else(|| MovecastError::ModelUnavailable(branch.to_string()))?;

        let today = self.clock.today();
        let window = select_window(requested, today, self.config.horizon);
        let raw_by_date: HashMap<NaiveDate, u64> = predictor
            .predict(&window.dates())
            .into_iter()
            .map(|(date, value)| (date, clip_and_round(value)))
            .collect();
        let emitted = window.emitted_dates(today);

        debug!(
            branch,
            category = category.unwrap_or("-"),
            start = %window.start,
            end = %window.end,
            days = emitted.len(),
            "Forecast window selected"
        );

        let floor = self.config.floor_percentage;
        let store = self.store.as_ref();
        let requested_percentage = match category {
            Some(category) => {
                percentage_or_floor(
                    store,
                    branch,
                    category,
                    requested.month(),
                    requested.day(),
                    floor,
                )
                .await?
            }
            None => 100.0,
        };

        let mut predicted_summary = Vec::with_capacity(emitted.len());
        let mut total_predicted: u64 = 0;
        let mut total_raw: u64 = 0;
        let mut day_percentages = Vec::with_capacity(emitted.len());

        for date in emitted {
            let raw = raw_by_date.get(&date).copied().unwrap_or(0);
            let (percentage, predicted, comment) = match category {
                Some(category) => {
                    let percentage =
                        percentage_or_floor(store, branch, category, date.month(), date.day(), floor)
                            .await?;
                    let predicted = blend(raw, percentage);
                    let historical = commentary_percentage(
                        store,
                        branch,
                        category,
                        date.month(),
                        date.day(),
                        requested_percentage,
                    )
                    .await?;
                    let implied = share_percentage(predicted, raw);
                    let (_, comment) =
                        day_comment(category, historical, implied, self.picker.as_ref());
                    (percentage, predicted, comment)
                }
                None => (100.0, raw, NO_CATEGORY_NOTICE.to_string()),
            };

            total_predicted = total_predicted.saturating_add(predicted);
            total_raw = total_raw.saturating_add(raw);
            day_percentages.push(percentage);
            predicted_summary.push(DailyForecast {
                date,
                predicted_moves: predicted,
                comment,
                raw_moves: raw,
                percentage,
            });
        }

        let average_daily_moves = if predicted_summary.is_empty() {
            0
        } else {
            clip_and_round(total_predicted as f64 / predicted_summary.len() as f64)
        };

        let summary = match category {
            Some(category) => {
                let current = share_percentage(total_predicted, total_raw);
                let historical = if day_percentages.is_empty() {
                    requested_percentage
                } else {
                    day_percentages.iter().sum::<f64>() / day_percentages.len() as f64
                };
                summary_comment(category, branch, historical, current, self.picker.as_ref()).1
            }
            None => no_category_summary(branch),
        };

        info!(
            branch,
            category = category.unwrap_or("-"),
            total = total_predicted,
            days = predicted_summary.len(),
            "Forecast produced"
        );

        Ok(ForecastResult {
            branch: branch.to_string(),
            category: category.map(str::to_string),
            forecast_window: window,
            predicted_summary,
            total_predicted_moves: total_predicted,
            average_daily_moves,
            summary_comment: summary,
        })
    }

    fn validate_date(&self, raw: &str) -> Result<NaiveDate> {
        let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
            MovecastError::Validation("Invalid date format. Use YYYY-MM-DD (e.g., '2025-06-11')".into())
        })?;
        if date > self.config.horizon {
            return Err(MovecastError::Validation(format!(
                "Date must be on or before {}",
                self.config.horizon.format("%Y-%m-%d")
            )));
        }
        Ok(date)
    }

    async fn validate_branch(&self, branch: &str) -> Result<()> {
        let branches = self.store.branches().await?;
        if branches.iter().any(|b| b == branch) {
            Ok(())
        } else {
            Err(MovecastError::Validation(format!(
                "Branch {} not found. Valid branches: {:?}",
                branch, branches
            )))
        }
    }

    async fn validate_category(&self, category: &str) -> Result<()> {
        let categories = self.store.categories().await?;
        if categories.iter().any(|c| c == category) {
            Ok(())
        } else {
            Err(MovecastError::Validation(format!(
                "Invalid move type {}. Valid move types: {:?}",
                category, categories
            )))
        }
    }
}
