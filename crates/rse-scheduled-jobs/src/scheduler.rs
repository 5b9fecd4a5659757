use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

use crate::error::ScheduledJobError;

/// The background work a `ScheduledJob` row drives — `run_scheduled_job`,
/// abstracted so the cron wiring doesn't need to know about
/// `AdmissionService` directly.
#[async_trait]
pub trait ScheduledTask: Send + Sync {
    async fn run(&self);
}

/// Cron-equivalent component exposing `register(name, schedule, fn)`. One
/// implementation per deployment mode: [`TokioCronScheduler`] for the
/// long-running server, [`NullCronScheduler`] for serverless deployments
/// that have no in-process scheduler to register against.
#[async_trait]
pub trait CronScheduler: Send + Sync {
    async fn register(
        &self,
        name: &str,
        schedule: &str,
        task: Arc<dyn ScheduledTask>,
    ) -> Result<(), ScheduledJobError>;

    async fn unregister(&self, name: &str) -> Result<(), ScheduledJobError>;
}

/// Real cron scheduler for the long-running server deployment mode. Keeps a
/// `name -> job uuid` index so `unregister` can find the right job to
/// remove.
pub struct TokioCronScheduler {
    inner: JobScheduler,
    by_name: Mutex<HashMap<String, Uuid>>,
}

impl TokioCronScheduler {
    pub async fn new() -> Result<Self, ScheduledJobError> {
        let inner = JobScheduler::new()
            .await
            .map_err(|e| ScheduledJobError::InvalidSchedule("<init>".into(), e.to_string()))?;
        inner
            .start()
            .await
            .map_err(|e| ScheduledJobError::InvalidSchedule("<start>".into(), e.to_string()))?;
        Ok(Self { inner, by_name: Mutex::new(HashMap::new()) })
    }
}

#[async_trait]
impl CronScheduler for TokioCronScheduler {
    async fn register(
        &self,
        name: &str,
        schedule: &str,
        task: Arc<dyn ScheduledTask>,
    ) -> Result<(), ScheduledJobError> {
        self.unregister(name).await.ok();

        let job = Job::new_async(schedule, move |_uuid, _scheduler| {
            let task = task.clone();
            Box::pin(async move { task.run().await })
        })
        .map_err(|e| ScheduledJobError::InvalidSchedule(schedule.to_string(), e.to_string()))?;

        let job_id = self
            .inner
            .add(job)
            .await
            .map_err(|e| ScheduledJobError::InvalidSchedule(schedule.to_string(), e.to_string()))?;

        self.by_name.lock().await.insert(name.to_string(), job_id);
        Ok(())
    }

    async fn unregister(&self, name: &str) -> Result<(), ScheduledJobError> {
        let mut by_name = self.by_name.lock().await;
        if let Some(job_id) = by_name.remove(name) {
            self.inner
                .remove(&job_id)
                .await
                .map_err(|e| ScheduledJobError::InvalidSchedule(name.to_string(), e.to_string()))?;
        }
        Ok(())
    }
}

/// No-op scheduler for deployment modes with no in-process cron driver
/// (serverless). `register`/`unregister` succeed silently;
/// `ScheduledJobService` callers are expected to check
/// `Settings::deployment_mode` before relying on execution actually
/// happening, returning `NotImplemented` for scheduled-job endpoints in
/// modes that lack a scheduler.
pub struct NullCronScheduler;

#[async_trait]
impl CronScheduler for NullCronScheduler {
    async fn register(
        &self,
        _name: &str,
        _schedule: &str,
        _task: Arc<dyn ScheduledTask>,
    ) -> Result<(), ScheduledJobError> {
        Ok(())
    }

    async fn unregister(&self, _name: &str) -> Result<(), ScheduledJobError> {
        Ok(())
    }
}
