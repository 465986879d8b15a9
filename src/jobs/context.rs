//! Job context for dependency injection

use crate::aggregator::{CheckpointStore, PercentageAggregator};
use crate::config::AggregatorConfig;
use crate::db::{PercentageStore, VolumeSource};
use crate::metrics::Metrics;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Context passed to job handlers via Apalis Data<T> pattern
pub struct JobContext {
    pub source: Arc<dyn VolumeSource>,
    pub store: Arc<dyn PercentageStore>,
    pub checkpoints: Arc<dyn CheckpointStore>,
    pub config: AggregatorConfig,
    pub metrics: Option<Arc<Metrics>>,
    /// Held for the length of a run; the checkpoint has a single writer
    pub run_lock: Mutex<()>,
}

impl JobContext {
    pub fn new(
        source: Arc<dyn VolumeSource>,
        store: Arc<dyn PercentageStore>,
        checkpoints: Arc<dyn CheckpointStore>,
        config: AggregatorConfig,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        Self {
            source,
            store,
            checkpoints,
            config,
            metrics,
            run_lock: Mutex::new(()),
        }
    }

    pub fn aggregator(&self) -> PercentageAggregator {
        let aggregator = PercentageAggregator::new(
            self.source.clone(),
            self.store.clone(),
            self.checkpoints.clone(),
            self.config.clone(),
        );
        match &self.metrics {
            Some(metrics) => aggregator.with_metrics(metrics.clone()),
            None => aggregator,
        }
    }
}
