//! Movecast one-shot aggregation
//!
//! Rebuilds the seasonal percentage table once and exits. Interrupted runs
//! resume from the checkpoint file on the next invocation.

use dotenvy::dotenv;
use movecast::aggregator::{FileCheckpointStore, PercentageAggregator};
use movecast::config::AggregatorConfig;
use movecast::db::PostgresStore;
use movecast::logging;
use movecast::metrics::Metrics;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let env = movecast::config::get_environment();
    let config = AggregatorConfig::from_env()?;
    info!("Starting Movecast aggregation");
    info!(environment = %env, "Environment");
    info!(
        min_year = config.min_year,
        max_year = config.max_year,
        batch_size = config.batch_size,
        checkpoint = %config.checkpoint_path.display(),
        "Aggregation settings"
    );

    let metrics = Arc::new(Metrics::new()?);
    let store = Arc::new(PostgresStore::connect(&movecast::config::get_database_url()?).await?);
    metrics.database_connected.set(1.0);
    info!("PostgreSQL connected");

    let checkpoints = Arc::new(FileCheckpointStore::new(config.checkpoint_path.clone()));
    let aggregator =
        PercentageAggregator::new(store.clone(), store, checkpoints, config).with_metrics(metrics);

    let shutdown = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    match aggregator.run_until(shutdown).await {
        Ok(summary) => {
            info!(
                rows = summary.rows_upserted,
                combinations = summary.combinations_total,
                resumed = summary.combinations_resumed,
                zero_totals = summary.zero_totals,
                failures = summary.failures.len(),
                "Aggregation finished"
            );
            if summary.failed_commits > 0 {
                warn!(failed_commits = summary.failed_commits, "Some batch commits needed more than one boundary");
            }
        }
        Err(e) => {
            error!(error = %e, "Aggregation did not complete, rerun to resume from the checkpoint");
            return Err(e.into());
        }
    }

    Ok(())
}
