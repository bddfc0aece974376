//! Delayed one-shot task queue.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

pub type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(pub Uuid);

#[async_trait]
pub trait TaskScheduler: Send + Sync {
    /// Runs `task` once, `delay` from now.
    async fn schedule(&self, delay: Duration, task: Task) -> Result<TaskHandle>;

    /// Drops a task that has not run yet. Unknown handles are ignored.
    async fn cancel(&self, handle: TaskHandle) -> Result<()>;
}

/// [`TaskScheduler`] on a tokio-cron-scheduler [`JobScheduler`].
#[derive(Clone)]
pub struct CronTaskScheduler {
    scheduler: JobScheduler,
}

impl CronTaskScheduler {
    pub async fn new() -> Result<Self> {
        let scheduler = JobScheduler::new().await?;
        Ok(Self { scheduler })
    }

    pub async fn start(&self) -> Result<()> {
        self.scheduler.start().await?;
        tracing::info!("Task scheduler started");
        Ok(())
    }

    pub async fn shutdown(&self) -> Result<()> {
        let mut scheduler = self.scheduler.clone();
        scheduler.shutdown().await?;
        Ok(())
    }
}

#[async_trait]
impl TaskScheduler for CronTaskScheduler {
    async fn schedule(&self, delay: Duration, task: Task) -> Result<TaskHandle> {
        // The job closure may be invoked more than once; the task runs on the first call
        let slot = Arc::new(Mutex::new(Some(task)));
        let job = Job::new_one_shot_async(delay, move |_uuid, _lock| {
            let slot = slot.clone();
            Box::pin(async move {
                let task = slot.lock().await.take();
                if let Some(task) = task {
                    task.await;
                }
            })
        })?;

        let id = self.scheduler.add(job).await?;
        tracing::debug!("Scheduled task {} in {}s", id, delay.as_secs());
        Ok(TaskHandle(id))
    }

    async fn cancel(&self, handle: TaskHandle) -> Result<()> {
        self.scheduler.remove(&handle.0).await?;
        tracing::debug!("Cancelled task {}", handle.0);
        Ok(())
    }
}
