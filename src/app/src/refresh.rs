use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;

/// Handle to a task that runs once right away and then every `interval`,
/// until [`RefreshTimer::stop`] is called.
pub struct RefreshTimer {
    scheduler: JobScheduler,
    job_id: Uuid,
    interval: Duration,
}

impl RefreshTimer {
    pub async fn start<F, Fut>(interval: Duration, task: F) -> Result<Self, AppError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task = Arc::new(task);
        let scheduler = JobScheduler::new().await.map_err(scheduler_error)?;

        let repeated = task.clone();
        let job = Job::new_repeated_async(interval, move |_uuid, _l| {
            let task = repeated.clone();
            Box::pin(async move {
                debug!("refresh timer tick");
                task().await;
            })
        })
        .map_err(scheduler_error)?;

        let job_id = scheduler.add(job).await.map_err(scheduler_error)?;
        scheduler.start().await.map_err(scheduler_error)?;

        // first run does not wait for the interval
        tokio::spawn(async move { task().await });

        info!("refresh timer started, every {:?}", interval);
        Ok(Self {
            scheduler,
            job_id,
            interval,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Removes the job and shuts the scheduler down; no further ticks fire.
    pub async fn stop(mut self) -> Result<(), AppError> {
        self.scheduler
            .remove(&self.job_id)
            .await
            .map_err(scheduler_error)?;
        self.scheduler.shutdown().await.map_err(scheduler_error)?;
        info!("refresh timer stopped");
        Ok(())
    }
}

fn scheduler_error<E: std::fmt::Debug>(e: E) -> AppError {
    AppError::Scheduler(format!("{:?}", e))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_runs_immediately_repeats_and_stops() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let timer = RefreshTimer::start(Duration::from_secs(1), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
        .await
        .unwrap();
        assert_eq!(timer.interval(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(count.load(Ordering::SeqCst) >= 1);

        tokio::time::sleep(Duration::from_millis(3300)).await;
        assert!(count.load(Ordering::SeqCst) >= 2);

        timer.stop().await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        let stopped_at = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(count.load(Ordering::SeqCst), stopped_at);
    }
}
