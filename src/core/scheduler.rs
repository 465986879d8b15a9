//! Cron-based scheduler for enqueuing percentage rebuilds

use crate::jobs::types::RebuildPercentagesJob;
use apalis::prelude::*;
use apalis_redis::RedisStorage;
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Scheduler that enqueues one RebuildPercentagesJob per cron tick
pub struct JobScheduler {
    storage: Arc<RedisStorage<RebuildPercentagesJob>>,
    job: RebuildPercentagesJob,
    schedule: Schedule,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl JobScheduler {
    /// `cron_expr` uses the six-field form: second minute hour day month weekday
    pub fn new(
        storage: Arc<RedisStorage<RebuildPercentagesJob>>,
        job: RebuildPercentagesJob,
        cron_expr: &str,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let schedule = parse_schedule(cron_expr)?;

        info!(
            cron = %cron_expr,
            min_year = job.min_year,
            max_year = job.max_year,
            "JobScheduler: created with cron {}",
            cron_expr
        );

        Ok(Self {
            storage,
            job,
            schedule,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let storage = self.storage.clone();
        let job = self.job.clone();
        let schedule = self.schedule.clone();
        let handle_arc = self.handle.clone();

        let handle = tokio::spawn(async move {
            info!("JobScheduler: started, waiting for cron schedule...");

            loop {
                let mut upcoming = schedule.upcoming(chrono::Utc);
                if let Some(next_tick) = upcoming.next() {
                    let now = chrono::Utc::now();
                    if next_tick > now {
                        let duration = (next_tick - now).to_std().unwrap_or_default();
                        tokio::time::sleep(duration).await;
                    }
                } else {
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                    continue;
                }

                let mut storage_clone = (*storage).clone();
                match storage_clone.push(job.clone()).await {
                    Ok(_) => {
                        info!(
                            min_year = job.min_year,
                            max_year = job.max_year,
                            "JobScheduler: enqueued RebuildPercentagesJob"
                        );
                    }
                    Err(e) => {
                        error!(error = %e, "JobScheduler: failed to enqueue RebuildPercentagesJob");
                    }
                }
            }
        });

        {
            let mut h = handle_arc.write().await;
            *h = Some(handle);
        }

        info!("JobScheduler: started successfully");
        Ok(())
    }

    /// Stop the scheduler
    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("JobScheduler: stopped");
        }
    }
}

pub fn parse_schedule(cron_expr: &str) -> Result<Schedule, Box<dyn std::error::Error + Send + Sync>> {
    Schedule::from_str(cron_expr).map_err(|e| {
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Invalid cron expression '{}': {}", cron_expr, e),
        )) as Box<dyn std::error::Error + Send + Sync>
    })
}
