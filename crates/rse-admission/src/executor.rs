use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rse_config::DeploymentMode;

use crate::error::AdmissionError;

/// One submission/termination call to whatever runs the actual scan —
/// AWS Batch in server mode, a task-queue worker in serverless mode. One
/// implementation per backend, dispatched through a registry keyed on the
/// deployment mode.
#[async_trait]
pub trait Executor: Send + Sync + 'static {
    /// Submit a standard or scheduled scan job; returns the executor-assigned
    /// job id to persist on the `Job` row.
    async fn submit_batch(&self, env: &HashMap<String, String>) -> Result<String, AdmissionError>;

    /// Submit an event-driven batch job; same contract as `submit_batch`,
    /// kept distinct because some deployments route event-driven work to a
    /// separate queue/priority class.
    async fn submit_event_driven(&self, env: &HashMap<String, String>) -> Result<String, AdmissionError>;

    /// Request termination of a previously submitted executor job.
    async fn terminate(&self, executor_job_id: &str) -> Result<(), AdmissionError>;
}

/// Dispatches to the `Executor` registered for the running deployment mode
/// — a closed set of interface implementations, chosen by a registry keyed
/// on an enum.
pub struct ExecutorRegistry {
    executors: HashMap<DeploymentMode, Box<dyn Executor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self { executors: HashMap::new() }
    }

    pub fn register(&mut self, mode: DeploymentMode, executor: Box<dyn Executor>) -> &mut Self {
        self.executors.insert(mode, executor);
        self
    }

    pub fn for_mode(&self, mode: DeploymentMode) -> Result<&dyn Executor, AdmissionError> {
        self.executors
            .get(&mode)
            .map(|e| e.as_ref())
            .ok_or_else(|| AdmissionError::Executor(format!("no executor registered for {mode:?}")))
    }
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Test double recording every call it receives; always succeeds with a
/// deterministic, caller-supplied job id.
pub struct InMemoryExecutor {
    next_id: Mutex<u64>,
    pub submitted: Mutex<Vec<HashMap<String, String>>>,
    pub terminated: Mutex<Vec<String>>,
}

impl InMemoryExecutor {
    pub fn new() -> Self {
        Self { next_id: Mutex::new(0), submitted: Mutex::new(Vec::new()), terminated: Mutex::new(Vec::new()) }
    }

    fn next_job_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        let id = *next;
        *next += 1;
        format!("exec-job-{id}")
    }
}

impl Default for InMemoryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Executor for InMemoryExecutor {
    async fn submit_batch(&self, env: &HashMap<String, String>) -> Result<String, AdmissionError> {
        self.submitted.lock().unwrap().push(env.clone());
        Ok(self.next_job_id())
    }

    async fn submit_event_driven(&self, env: &HashMap<String, String>) -> Result<String, AdmissionError> {
        self.submitted.lock().unwrap().push(env.clone());
        Ok(self.next_job_id())
    }

    async fn terminate(&self, executor_job_id: &str) -> Result<(), AdmissionError> {
        self.terminated.lock().unwrap().push(executor_job_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registry_dispatches_by_mode() {
        let mut registry = ExecutorRegistry::new();
        registry.register(DeploymentMode::Server, Box::new(InMemoryExecutor::new()));
        assert!(registry.for_mode(DeploymentMode::Server).is_ok());
        assert!(registry.for_mode(DeploymentMode::Serverless).is_err());
    }

    #[tokio::test]
    async fn in_memory_executor_records_submissions() {
        let executor = InMemoryExecutor::new();
        let id = executor.submit_batch(&HashMap::new()).await.unwrap();
        assert_eq!(id, "exec-job-0");
        assert_eq!(executor.submitted.lock().unwrap().len(), 1);
    }
}
