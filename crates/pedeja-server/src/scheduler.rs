//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! session expiry sweep.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::session::SessionStore;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process; dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(sessions: SessionStore) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    // Every minute: drop expired admin sessions so the poller stops working
    // for stores nobody is watching.
    let job = Job::new_async("0 * * * * *", move |_uuid, _lock| {
        let sessions = sessions.clone();
        Box::pin(async move {
            let removed = sessions.purge_expired().await;
            if removed > 0 {
                tracing::info!(removed, "session sweep removed expired sessions");
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    Ok(scheduler)
}
