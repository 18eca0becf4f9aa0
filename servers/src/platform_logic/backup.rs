//! Automatic daily backup. A cron job reloads the content tree and upserts
//! the day's backup row; the schedule comes from the configuration
//! (midnight by default).

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::platform_logic::state::AppState;

/// Runs one backup cycle: refresh the snapshot from the database, persist
/// it as today's backup.
pub async fn run_backup(state: &AppState) {
    match backup_once(state).await {
        Ok(date) => info!("automatic backup stored for {}", date),
        Err(e) => error!("automatic backup failed: {}", e),
    }
}

async fn backup_once(state: &AppState) -> Result<chrono::NaiveDate> {
    let snapshot = state.reload().await?;
    let date = state.store().create_backup(&snapshot).await?;
    Ok(date)
}

/// Starts the backup scheduler. The returned scheduler must be kept alive
/// for the jobs to keep firing.
pub async fn start_backup_scheduler(state: AppState) -> Result<JobScheduler> {
    let schedule = state.config().backup_schedule().to_string();
    let scheduler = JobScheduler::new().await?;

    let job_state = state.clone();
    let job = Job::new_async(schedule.as_str(), move |_uuid, _lock| {
        let state = job_state.clone();
        Box::pin(async move {
            run_backup(&state).await;
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    info!("daily backup scheduled: {}", schedule);

    Ok(scheduler)
}
