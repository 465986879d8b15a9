//! Integration tests for the rebuild job
//!
//! Runs the job handler logic against the in-memory store; the Redis-backed
//! queue itself is not exercised here.

use crate::fixtures::{aggregator_config, volume_store, LOCAL};
use movecast::aggregator::{CheckpointStore, MemoryCheckpointStore};
use movecast::db::{MemoryStore, PercentageStore};
use movecast::error::MovecastError;
use movecast::jobs::handlers::rebuild_percentages;
use movecast::jobs::{JobContext, RebuildPercentagesJob};
use movecast::metrics::Metrics;
use movecast::models::{Checkpoint, Combination};
use std::sync::Arc;

fn context(store: &Arc<MemoryStore>, metrics: Option<Arc<Metrics>>) -> (JobContext, Arc<MemoryCheckpointStore>) {
    let checkpoints = Arc::new(MemoryCheckpointStore::new());
    let ctx = JobContext::new(
        store.clone(),
        store.clone(),
        checkpoints.clone(),
        aggregator_config(2, 0),
        metrics,
    );
    (ctx, checkpoints)
}

#[tokio::test]
async fn rebuild_job_populates_percentages() {
    let store = Arc::new(volume_store());
    let metrics = Arc::new(Metrics::new().unwrap());
    let (ctx, checkpoints) = context(&store, Some(metrics.clone()));

    let summary = rebuild_percentages(&RebuildPercentagesJob::new(2021, 2024), &ctx)
        .await
        .unwrap();

    assert_eq!(summary.rows_upserted, 6);
    assert_eq!(
        store.exact_percentage("Dallas", LOCAL, 1, 5).await.unwrap(),
        Some(25.0)
    );
    assert_eq!(checkpoints.load().unwrap(), None);
    assert_eq!(metrics.aggregator_rows_upserted.get(), 6);
    assert_eq!(metrics.aggregator_combinations_visited.get(), 2 * 2 * 12 * 31);
}

#[tokio::test]
async fn rebuild_job_uses_its_own_year_range() {
    let store = Arc::new(volume_store());
    let (ctx, _) = context(&store, None);

    rebuild_percentages(&RebuildPercentagesJob::new(2023, 2023), &ctx)
        .await
        .unwrap();

    assert_eq!(
        store.exact_percentage("Dallas", LOCAL, 1, 5).await.unwrap(),
        Some(20.0)
    );
}

#[tokio::test]
async fn inverted_year_range_is_rejected() {
    let store = Arc::new(volume_store());
    let (ctx, _) = context(&store, None);

    let result = rebuild_percentages(&RebuildPercentagesJob::new(2024, 2021), &ctx).await;
    assert!(matches!(result, Err(MovecastError::Config(_))));
    assert_eq!(store.upsert_calls(), 0);
}

#[tokio::test]
async fn overlapping_rebuilds_run_one_at_a_time() {
    let store = Arc::new(volume_store());
    let (ctx, _) = context(&store, None);
    let job = RebuildPercentagesJob::new(2021, 2024);

    let (first, second) = tokio::join!(
        rebuild_percentages(&job, &ctx),
        rebuild_percentages(&job, &ctx)
    );

    assert_eq!(first.unwrap().rows_upserted, 6);
    assert_eq!(second.unwrap().rows_upserted, 6);
    assert_eq!(store.snapshot().await.len(), 6);
}

#[tokio::test]
async fn job_ignores_checkpoint_left_by_another_year_range() {
    let store = Arc::new(volume_store());
    // An interrupted 2023-only rebuild stopped at Dallas/Local
    let checkpoints = Arc::new(MemoryCheckpointStore::starting_at(Checkpoint::new(
        2023,
        2023,
        Combination::new("Dallas", LOCAL, 1, 1),
    )));
    let ctx = JobContext::new(
        store.clone(),
        store.clone(),
        checkpoints.clone(),
        aggregator_config(2, 0),
        None,
    );

    let summary = rebuild_percentages(&RebuildPercentagesJob::new(2021, 2024), &ctx)
        .await
        .unwrap();

    assert_eq!(summary.combinations_resumed, 0);
    assert_eq!(summary.rows_upserted, 6);
    assert_eq!(
        store.exact_percentage("Austin", LOCAL, 3, 1).await.unwrap(),
        Some(25.0)
    );
    assert_eq!(checkpoints.load().unwrap(), None);
}

#[test]
fn job_payload_round_trips_through_json() {
    let job = RebuildPercentagesJob::new(2021, 2024);
    let raw = serde_json::to_string(&job).unwrap();
    assert_eq!(raw, r#"{"min_year":2021,"max_year":2024}"#);
}
