//! Apalis worker setup for percentage rebuild jobs

use crate::jobs::context::JobContext;
use crate::jobs::handlers;
use crate::jobs::types::RebuildPercentagesJob;
use apalis::prelude::*;
use apalis_redis::RedisStorage;
use std::sync::Arc;
use tracing::info;

/// Runtime that owns the rebuild worker
pub struct RebuildRuntime {
    job_context: Arc<JobContext>,
    storage: Arc<RedisStorage<RebuildPercentagesJob>>,
}

impl RebuildRuntime {
    pub fn new(
        job_context: Arc<JobContext>,
        storage: Arc<RedisStorage<RebuildPercentagesJob>>,
    ) -> Self {
        Self {
            job_context,
            storage,
        }
    }

    /// Start the worker and return its handle for graceful shutdown
    pub async fn start_worker(
        &self,
    ) -> Result<tokio::task::JoinHandle<()>, Box<dyn std::error::Error + Send + Sync>> {
        let storage = (*self.storage).clone();
        let job_context = self.job_context.clone();

        let handle = tokio::spawn(async move {
            let worker = WorkerBuilder::new("rebuild-percentages-worker")
                .data(job_context.clone())
                .backend(storage)
                .build_fn(handlers::handle_rebuild_percentages);

            info!("RebuildRuntime: RebuildPercentagesJob worker started");
            worker.run().await;
        });

        Ok(handle)
    }
}
