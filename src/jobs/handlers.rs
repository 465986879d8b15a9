//! Job handlers for the rebuild workflow

use crate::aggregator::RunSummary;
use crate::error::{MovecastError, Result};
use crate::jobs::context::JobContext;
use crate::jobs::types::RebuildPercentagesJob;
use apalis::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Run the aggregator for the job's year range
pub async fn rebuild_percentages(
    job: &RebuildPercentagesJob,
    ctx: &JobContext,
) -> Result<RunSummary> {
    if job.min_year > job.max_year {
        return Err(MovecastError::Config(format!(
            "min_year ({}) is after max_year ({})",
            job.min_year, job.max_year
        )));
    }
    let _guard = ctx.run_lock.lock().await;
    ctx.aggregator().run_years(job.min_year, job.max_year).await
}

/// Handler for the rebuild job
///
/// A failed run leaves its checkpoint behind, so a retried job resumes.
pub async fn handle_rebuild_percentages(
    job: RebuildPercentagesJob,
    ctx: Data<Arc<JobContext>>,
) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!(
        min_year = job.min_year,
        max_year = job.max_year,
        "RebuildPercentagesJob: rebuilding percentages for {}..={}",
        job.min_year,
        job.max_year
    );
    let started = Instant::now();

    match rebuild_percentages(&job, &ctx).await {
        Ok(summary) => {
            info!(
                rows = summary.rows_upserted,
                failures = summary.failures.len(),
                failed_commits = summary.failed_commits,
                duration_ms = started.elapsed().as_millis() as u64,
                "RebuildPercentagesJob: completed"
            );
            Ok(())
        }
        Err(e) => {
            error!(
                min_year = job.min_year,
                max_year = job.max_year,
                error = %e,
                "RebuildPercentagesJob: failed"
            );
            Err(e.into())
        }
    }
}
