//! Seasonal percentage precomputation
//!
//! Load -> group -> enumerate every (branch, category, month, day) in a fixed
//! order -> upsert in batches, checkpointing after each committed batch.

use crate::aggregator::checkpoint::CheckpointStore;
use crate::aggregator::combinations::CombinationSpace;
use crate::aggregator::grouping::GroupedVolumes;
use crate::config::AggregatorConfig;
use crate::db::{PercentageStore, VolumeSource};
use crate::error::{MovecastError, Result};
use crate::metrics::Metrics;
use crate::models::{Checkpoint, Combination, SeasonalPercentage};
use backon::{ExponentialBuilder, Retryable};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const PROGRESS_LOG_EVERY: usize = 10_000;

/// A combination that could not be computed, kept for audit
#[derive(Debug, Clone, PartialEq)]
pub struct CombinationFailure {
    pub combination: Combination,
    pub reason: String,
}

/// What a run did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub resumed_from: Option<Checkpoint>,
    /// Size of the enumeration, including invalid days
    pub combinations_total: usize,
    /// Combinations before the checkpoint that were passed over
    pub combinations_resumed: usize,
    pub invalid_days: usize,
    pub zero_totals: usize,
    pub rows_upserted: u64,
    /// Batch commits that failed after all retries and were carried forward
    pub failed_commits: usize,
    pub failures: Vec<CombinationFailure>,
}

/// Result of evaluating one combination
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    InvalidDay,
    ZeroTotal,
    Row(SeasonalPercentage),
    Failed(String),
}

/// Compute the percentage for one combination from the grouped tables
pub fn evaluate(grouped: &GroupedVolumes, combination: &Combination) -> Outcome {
    if !combination.is_valid_calendar_day() {
        return Outcome::InvalidDay;
    }

    let Combination {
        branch,
        category,
        month,
        day,
    } = combination;
    let category_count = grouped.category_count(branch, category, *month, *day);
    let total_count = grouped.total_count(branch, *month, *day);

    if category_count < 0 || total_count < 0 {
        return Outcome::Failed(format!(
            "negative volume (category {}, total {})",
            category_count, total_count
        ));
    }
    if total_count == 0 {
        return Outcome::ZeroTotal;
    }

    let avg_percentage = 100.0 * category_count as f64 / total_count as f64;
    if !avg_percentage.is_finite() {
        return Outcome::Failed(format!("non-finite percentage {}", avg_percentage));
    }

    Outcome::Row(SeasonalPercentage {
        branch: branch.clone(),
        category: category.clone(),
        month: *month,
        day: *day,
        avg_percentage,
    })
}

pub struct PercentageAggregator {
    source: Arc<dyn VolumeSource>,
    store: Arc<dyn PercentageStore>,
    checkpoints: Arc<dyn CheckpointStore>,
    config: AggregatorConfig,
    metrics: Option<Arc<Metrics>>,
}

impl PercentageAggregator {
    pub fn new(
        source: Arc<dyn VolumeSource>,
        store: Arc<dyn PercentageStore>,
        checkpoints: Arc<dyn CheckpointStore>,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            source,
            store,
            checkpoints,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run over the configured year range
    pub async fn run(&self) -> Result<RunSummary> {
        self.run_years(self.config.min_year, self.config.max_year).await
    }

    /// Run over the configured year range until `shutdown` resolves. An
    /// interrupted run returns `Interrupted` and leaves the checkpoint behind.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<RunSummary>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = shutdown => {
                warn!("PercentageAggregator: interrupted, checkpoint left for the next run");
                Err(MovecastError::Interrupted)
            }
            result = self.run() => result,
        }
    }

    pub async fn run_years(&self, min_year: i32, max_year: i32) -> Result<RunSummary> {
        info!(min_year, max_year, "PercentageAggregator: loading source data");
        let grouped = self.load(min_year, max_year).await?;

        let space = CombinationSpace::new(grouped.branches(), grouped.categories());
        let checkpoint = match self.checkpoints.load()? {
            Some(cp) if cp.covers(min_year, max_year) => Some(cp),
            Some(cp) => {
                warn!(
                    checkpoint_min_year = cp.min_year,
                    checkpoint_max_year = cp.max_year,
                    min_year,
                    max_year,
                    "PercentageAggregator: checkpoint is for another year range, discarding it"
                );
                self.checkpoints.clear()?;
                None
            }
            None => None,
        };
        let mut summary = RunSummary {
            resumed_from: checkpoint.clone(),
            combinations_total: space.len(),
            ..RunSummary::default()
        };

        match &checkpoint {
            Some(cp) => info!(
                branch = %cp.next.branch,
                category = %cp.next.category,
                month = cp.next.month,
                day = cp.next.day,
                "PercentageAggregator: resuming from checkpoint"
            ),
            None => info!("PercentageAggregator: no checkpoint, starting from the beginning"),
        }
        info!(
            branches = grouped.branches().len(),
            categories = grouped.categories().len(),
            combinations = space.len(),
            "PercentageAggregator: processing {} combinations",
            space.len()
        );

        let mut batch: Vec<SeasonalPercentage> = Vec::with_capacity(self.config.batch_size);
        let mut flush_at = self.config.batch_size;
        let mut visited = 0usize;
        let mut combinations = space.iter().peekable();

        while let Some(combination) = combinations.next() {
            visited += 1;
            self.record(|m| m.aggregator_combinations_visited.inc());
            if visited % PROGRESS_LOG_EVERY == 0 {
                info!(
                    visited,
                    total = summary.combinations_total,
                    rows = summary.rows_upserted,
                    "PercentageAggregator: progress {}/{}",
                    visited,
                    summary.combinations_total
                );
            }

            if let Some(cp) = &checkpoint {
                if combination < cp.next {
                    summary.combinations_resumed += 1;
                    continue;
                }
            }

            match evaluate(&grouped, &combination) {
                Outcome::InvalidDay => summary.invalid_days += 1,
                Outcome::ZeroTotal => {
                    debug!(
                        branch = %combination.branch,
                        category = %combination.category,
                        month = combination.month,
                        day = combination.day,
                        "PercentageAggregator: skipping, total count is 0"
                    );
                    summary.zero_totals += 1;
                    self.record(|m| m.aggregator_combinations_skipped.inc());
                }
                Outcome::Row(row) => batch.push(row),
                Outcome::Failed(reason) => {
                    error!(
                        branch = %combination.branch,
                        category = %combination.category,
                        month = combination.month,
                        day = combination.day,
                        reason = %reason,
                        "PercentageAggregator: failed to process combination"
                    );
                    self.record(|m| m.aggregator_combinations_skipped.inc());
                    // With nothing uncommitted, step past the bad combination right away
                    if batch.is_empty() {
                        if let Some(next) = combinations.peek() {
                            self.save_checkpoint(Checkpoint::new(min_year, max_year, next.clone()));
                        }
                    }
                    summary.failures.push(CombinationFailure {
                        combination,
                        reason,
                    });
                }
            }

            if batch.len() >= flush_at {
                let next = combinations.peek().cloned();
                match self.commit(&batch).await {
                    Ok(written) => {
                        summary.rows_upserted += written;
                        batch.clear();
                        flush_at = self.config.batch_size;
                        info!(
                            total_rows = summary.rows_upserted,
                            "PercentageAggregator: committed batch, {} rows so far",
                            summary.rows_upserted
                        );
                        if let Some(next) = next {
                            self.save_checkpoint(Checkpoint::new(min_year, max_year, next));
                        }
                    }
                    Err(e) => {
                        // Rows stay pending; the checkpoint stays behind them
                        error!(
                            error = %e,
                            pending = batch.len(),
                            "PercentageAggregator: batch commit failed, retrying at next boundary"
                        );
                        summary.failed_commits += 1;
                        self.record(|m| m.aggregator_batch_failures.inc());
                        flush_at = batch.len() + self.config.batch_size;
                    }
                }
            }
        }

        if !batch.is_empty() {
            let written = self.commit(&batch).await.map_err(|e| {
                error!(
                    error = %e,
                    pending = batch.len(),
                    "PercentageAggregator: final batch commit failed, checkpoint kept"
                );
                e
            })?;
            summary.rows_upserted += written;
        }

        self.checkpoints.clear()?;

        info!(
            rows = summary.rows_upserted,
            invalid_days = summary.invalid_days,
            zero_totals = summary.zero_totals,
            resumed = summary.combinations_resumed,
            failed = summary.failures.len(),
            "PercentageAggregator: completed precomputation"
        );
        for failure in &summary.failures {
            warn!(
                branch = %failure.combination.branch,
                category = %failure.combination.category,
                month = failure.combination.month,
                day = failure.combination.day,
                reason = %failure.reason,
                "PercentageAggregator: skipped combination"
            );
        }

        Ok(summary)
    }

    async fn load(&self, min_year: i32, max_year: i32) -> Result<GroupedVolumes> {
        let source = self.source.as_ref();

        let totals = (|| async move { source.load_totals(min_year, max_year).await })
            .retry(self.backoff())
            .when(MovecastError::is_transient)
            .notify(|e: &MovecastError, delay: Duration| {
                warn!(error = %e, delay_ms = delay.as_millis() as u64, "PercentageAggregator: retrying totals load");
            })
            .await?;
        let categories = (|| async move { source.load_categories(min_year, max_year).await })
            .retry(self.backoff())
            .when(MovecastError::is_transient)
            .notify(|e: &MovecastError, delay: Duration| {
                warn!(error = %e, delay_ms = delay.as_millis() as u64, "PercentageAggregator: retrying category load");
            })
            .await?;

        info!(
            totals = totals.len(),
            categories = categories.len(),
            "PercentageAggregator: loaded {} total rows and {} category rows",
            totals.len(),
            categories.len()
        );

        if totals.is_empty() || categories.is_empty() {
            return Err(MovecastError::Data(format!(
                "no source rows for {}..={} (totals: {}, categories: {})",
                min_year,
                max_year,
                totals.len(),
                categories.len()
            )));
        }

        let grouped = GroupedVolumes::build(totals, categories);
        if grouped.null_counts() > 0 {
            warn!(
                nulls = grouped.null_counts(),
                "PercentageAggregator: null values found in Count column, excluded from sums"
            );
        }
        Ok(grouped)
    }

    async fn commit(&self, batch: &[SeasonalPercentage]) -> Result<u64> {
        let store = self.store.as_ref();
        let written = (|| async move { store.upsert_percentages(batch).await })
            .retry(self.backoff())
            .when(MovecastError::is_transient)
            .notify(|e: &MovecastError, delay: Duration| {
                warn!(error = %e, delay_ms = delay.as_millis() as u64, "PercentageAggregator: retrying batch commit");
            })
            .await?;
        self.record(|m| m.aggregator_rows_upserted.inc_by(written));
        Ok(written)
    }

    fn save_checkpoint(&self, checkpoint: Checkpoint) {
        if let Err(e) = self.checkpoints.save(&checkpoint) {
            warn!(error = %e, "PercentageAggregator: failed to save checkpoint");
        }
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.config.retry_delay)
            .with_max_times(self.config.store_retries)
    }

    fn record(&self, f: impl FnOnce(&Metrics)) {
        if let Some(metrics) = &self.metrics {
            f(metrics);
        }
    }
}
