//! Movecast Worker
//!
//! Processes percentage rebuild jobs from the Redis queue and enqueues one
//! on the configured cron schedule. Runs separately from the API server.

use apalis_redis::RedisStorage;
use dotenvy::dotenv;
use movecast::aggregator::FileCheckpointStore;
use movecast::config::AggregatorConfig;
use movecast::core::runtime::RebuildRuntime;
use movecast::core::scheduler::JobScheduler;
use movecast::db::PostgresStore;
use movecast::jobs::context::JobContext;
use movecast::jobs::types::RebuildPercentagesJob;
use movecast::logging;
use movecast::metrics::Metrics;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let env = movecast::config::get_environment();
    info!("Starting Movecast Worker");
    info!(environment = %env, "Environment");

    let config = AggregatorConfig::from_env()?;
    let cron_expr = movecast::config::get_rebuild_cron();
    let metrics = Arc::new(Metrics::new()?);

    info!("Initializing PostgreSQL connection...");
    let store = match PostgresStore::connect(&movecast::config::get_database_url()?).await {
        Ok(store) => {
            info!("PostgreSQL connected");
            metrics.database_connected.set(1.0);
            Arc::new(store)
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to PostgreSQL");
            return Err(format!("PostgreSQL connection required for worker: {}", e).into());
        }
    };

    info!("Initializing Apalis Redis storage...");
    let redis_url = movecast::config::get_redis_url();
    let conn = apalis_redis::connect(redis_url.clone()).await?;
    let storage: Arc<RedisStorage<RebuildPercentagesJob>> = Arc::new(RedisStorage::new(conn));
    info!("Apalis Redis storage initialized");

    let job = RebuildPercentagesJob::new(config.min_year, config.max_year);
    let checkpoints = Arc::new(FileCheckpointStore::new(config.checkpoint_path.clone()));
    let job_context = Arc::new(JobContext::new(
        store.clone(),
        store,
        checkpoints,
        config,
        Some(metrics.clone()),
    ));

    info!("Starting Apalis worker...");
    let runtime = RebuildRuntime::new(job_context, storage.clone());
    let worker_handle = runtime
        .start_worker()
        .await
        .map_err(|e| format!("Failed to start worker: {}", e))?;

    info!("Starting job scheduler...");
    let scheduler = JobScheduler::new(storage, job, &cron_expr)
        .map_err(|e| format!("Failed to create scheduler: {}", e))?;
    scheduler
        .start()
        .await
        .map_err(|e| format!("Failed to start scheduler: {}", e))?;

    info!("Worker started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down worker...");
            scheduler.stop().await;
            worker_handle.abort();
            info!("Worker stopped");
        }
    }

    Ok(())
}
