use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use rse_domain::{
    BatchResults, BatchResultsId, Cloud, CustomerName, Event, Job, JobId, License, LicenseKey,
    ResourceException, ResourceExceptionId, Rule, RuleSource, RuleSourceId, Ruleset, RulesetId,
    RulesetVersion, ScheduledJob, Tenant, TenantName,
};

use crate::error::StoreError;
use crate::lock::JobLock;
use crate::store::Store;

#[derive(Debug, Default)]
struct Inner {
    tenants: HashMap<TenantName, Tenant>,
    licenses: HashMap<LicenseKey, License>,
    rules: HashMap<(CustomerName, String), Rule>,
    rule_sources: HashMap<RuleSourceId, RuleSource>,
    // (customer, name, version-string) -> Ruleset
    rulesets: HashMap<(CustomerName, String, String), Ruleset>,
    jobs: HashMap<JobId, Job>,
    batch_results: HashMap<BatchResultsId, BatchResults>,
    events: Vec<Event>,
    event_cursor: f64,
    scheduled_jobs: HashMap<(String, String), ScheduledJob>,
    exceptions: HashMap<ResourceExceptionId, ResourceException>,
    job_locks: HashMap<TenantName, JobLock>,
}

/// In-memory implementation of [`Store`]. All data is lost on process exit.
/// Suitable for tests and local dev.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_tenant(&self, name: &TenantName) -> Result<Option<Tenant>, StoreError> {
        Ok(self.inner.read().await.tenants.get(name).cloned())
    }

    async fn upsert_tenant(&self, tenant: &Tenant) -> Result<(), StoreError> {
        self.inner.write().await.tenants.insert(tenant.name.clone(), tenant.clone());
        Ok(())
    }

    async fn find_tenant_by_cloud_project(
        &self,
        cloud: Cloud,
        project: &str,
    ) -> Result<Option<Tenant>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .tenants
            .values()
            .find(|t| t.cloud == cloud && t.project == project)
            .cloned())
    }

    async fn get_license(&self, key: &LicenseKey) -> Result<Option<License>, StoreError> {
        Ok(self.inner.read().await.licenses.get(key).cloned())
    }

    async fn list_licenses_for_customer(&self, customer: &CustomerName) -> Result<Vec<License>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .licenses
            .values()
            .filter(|l| l.customers.contains_key(customer))
            .cloned()
            .collect())
    }

    async fn upsert_license(&self, license: &License) -> Result<(), StoreError> {
        self.inner.write().await.licenses.insert(license.license_key.clone(), license.clone());
        Ok(())
    }

    async fn get_rule(&self, customer: &CustomerName, name: &str) -> Result<Option<Rule>, StoreError> {
        Ok(self.inner.read().await.rules.get(&(customer.clone(), name.to_string())).cloned())
    }

    async fn list_rules_for_customer_cloud(
        &self,
        customer: &CustomerName,
        cloud: Cloud,
    ) -> Result<Vec<Rule>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .rules
            .values()
            .filter(|r| &r.customer == customer && r.cloud == cloud)
            .cloned()
            .collect())
    }

    async fn upsert_rule(&self, rule: &Rule) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .rules
            .insert((rule.customer.clone(), rule.name.clone()), rule.clone());
        Ok(())
    }

    async fn get_rule_source(&self, id: &RuleSourceId) -> Result<Option<RuleSource>, StoreError> {
        Ok(self.inner.read().await.rule_sources.get(id).cloned())
    }

    async fn upsert_rule_source(&self, source: &RuleSource) -> Result<(), StoreError> {
        self.inner.write().await.rule_sources.insert(source.id.clone(), source.clone());
        Ok(())
    }

    async fn get_ruleset(
        &self,
        customer: &CustomerName,
        name: &str,
        version: &RulesetVersion,
    ) -> Result<Option<Ruleset>, StoreError> {
        let key = (customer.clone(), name.to_string(), version.to_string());
        Ok(self.inner.read().await.rulesets.get(&key).cloned())
    }

    async fn get_ruleset_by_id(&self, id: &RulesetId) -> Result<Option<Ruleset>, StoreError> {
        Ok(self.inner.read().await.rulesets.values().find(|r| &r.id == id).cloned())
    }

    async fn get_latest_ruleset(
        &self,
        customer: &CustomerName,
        name: &str,
    ) -> Result<Option<Ruleset>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard
            .rulesets
            .values()
            .filter(|r| &r.customer == customer && r.name == name)
            .max_by(|a, b| a.created_at.cmp(&b.created_at))
            .cloned())
    }

    async fn list_ruleset_versions(
        &self,
        customer: &CustomerName,
        name: &str,
    ) -> Result<Vec<Ruleset>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .rulesets
            .values()
            .filter(|r| &r.customer == customer && r.name == name)
            .cloned()
            .collect())
    }

    async fn upsert_ruleset(&self, ruleset: &Ruleset) -> Result<(), StoreError> {
        let key = (ruleset.customer.clone(), ruleset.name.clone(), ruleset.version.to_string());
        self.inner.write().await.rulesets.insert(key, ruleset.clone());
        Ok(())
    }

    async fn delete_ruleset(
        &self,
        customer: &CustomerName,
        name: &str,
        version: Option<&RulesetVersion>,
    ) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        match version {
            Some(v) => {
                guard.rulesets.remove(&(customer.clone(), name.to_string(), v.to_string()));
            }
            None => {
                guard
                    .rulesets
                    .retain(|(c, n, _), _| !(c == customer && n == name));
            }
        }
        Ok(())
    }

    async fn get_job(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.inner.read().await.jobs.get(id).cloned())
    }

    async fn upsert_job(&self, job: &Job) -> Result<(), StoreError> {
        self.inner.write().await.jobs.insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn list_jobs_for_tenant(&self, tenant: &TenantName) -> Result<Vec<Job>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .jobs
            .values()
            .filter(|j| &j.tenant_name == tenant)
            .cloned()
            .collect())
    }

    async fn get_batch_results(&self, id: &BatchResultsId) -> Result<Option<BatchResults>, StoreError> {
        Ok(self.inner.read().await.batch_results.get(id).cloned())
    }

    async fn upsert_batch_results(&self, batch: &BatchResults) -> Result<(), StoreError> {
        self.inner.write().await.batch_results.insert(batch.id.clone(), batch.clone());
        Ok(())
    }

    async fn append_event(&self, event: &Event) -> Result<(), StoreError> {
        self.inner.write().await.events.push(event.clone());
        Ok(())
    }

    async fn list_events_since(
        &self,
        partition: u32,
        since: f64,
        limit: u32,
    ) -> Result<Vec<Event>, StoreError> {
        let guard = self.inner.read().await;
        let mut matched: Vec<Event> = guard
            .events
            .iter()
            .filter(|e| e.partition == partition && e.timestamp > since)
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.timestamp.partial_cmp(&b.timestamp).unwrap());
        matched.truncate(limit as usize);
        Ok(matched)
    }

    async fn delete_events_up_to(&self, cursor: f64) -> Result<u64, StoreError> {
        let mut guard = self.inner.write().await;
        let before = guard.events.len();
        guard.events.retain(|e| e.timestamp > cursor);
        Ok((before - guard.events.len()) as u64)
    }

    async fn get_event_cursor(&self) -> Result<f64, StoreError> {
        Ok(self.inner.read().await.event_cursor)
    }

    async fn set_event_cursor(&self, cursor: f64) -> Result<(), StoreError> {
        self.inner.write().await.event_cursor = cursor;
        Ok(())
    }

    async fn get_scheduled_job(&self, customer: &str, name: &str) -> Result<Option<ScheduledJob>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .scheduled_jobs
            .get(&(customer.to_string(), name.to_string()))
            .cloned())
    }

    async fn list_scheduled_jobs_for_tenant(&self, tenant: &TenantName) -> Result<Vec<ScheduledJob>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .scheduled_jobs
            .values()
            .filter(|j| &j.tenant == tenant)
            .cloned()
            .collect())
    }

    async fn upsert_scheduled_job(&self, job: &ScheduledJob) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        let key = (job.customer.clone(), job.name.clone());
        if let Some(existing) = guard.scheduled_jobs.get(&key) {
            if existing.tenant != job.tenant {
                return Err(StoreError::Duplicate(format!(
                    "scheduled job '{}' already exists for customer '{}'",
                    job.name, job.customer
                )));
            }
        }
        guard.scheduled_jobs.insert(key, job.clone());
        Ok(())
    }

    async fn delete_scheduled_job(&self, customer: &str, name: &str) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .scheduled_jobs
            .remove(&(customer.to_string(), name.to_string()));
        Ok(())
    }

    async fn list_exceptions(
        &self,
        customer: &str,
        tenant: Option<&TenantName>,
    ) -> Result<Vec<ResourceException>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .exceptions
            .values()
            .filter(|e| {
                e.customer == customer
                    && match (&e.tenant, tenant) {
                        (Some(et), Some(t)) => et == t,
                        (None, _) => true,
                        (Some(_), None) => false,
                    }
            })
            .cloned()
            .collect())
    }

    async fn upsert_exception(&self, exception: &ResourceException) -> Result<(), StoreError> {
        self.inner.write().await.exceptions.insert(exception.id.clone(), exception.clone());
        Ok(())
    }

    async fn delete_exception(&self, id: &ResourceExceptionId) -> Result<(), StoreError> {
        self.inner.write().await.exceptions.remove(id);
        Ok(())
    }

    async fn get_job_lock(&self, tenant: &TenantName) -> Result<Option<JobLock>, StoreError> {
        Ok(self.inner.read().await.job_locks.get(tenant).cloned())
    }

    async fn acquire_job_lock(&self, tenant: &TenantName, lock: JobLock) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        if let Some(existing) = guard.job_locks.get(tenant) {
            if existing.intersects(&lock.regions, lock.platform_id.as_deref()) {
                return Err(StoreError::LockConflict { holder: existing.holder_job_id.to_string() });
            }
        }
        guard.job_locks.insert(tenant.clone(), lock);
        Ok(())
    }

    async fn release_job_lock(&self, tenant: &TenantName) -> Result<(), StoreError> {
        self.inner.write().await.job_locks.remove(tenant);
        Ok(())
    }

    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tenant(name: &str) -> Tenant {
        Tenant {
            name: TenantName::new(name),
            customer: CustomerName::new("C1"),
            cloud: Cloud::Aws,
            project: "acct-1".into(),
            active_regions: vec!["us-east-1".into()],
            is_active: true,
        }
    }

    #[tokio::test]
    async fn upsert_and_get_tenant() {
        let store = InMemoryStore::new();
        store.upsert_tenant(&tenant("T1")).await.unwrap();
        let got = store.get_tenant(&TenantName::new("T1")).await.unwrap();
        assert!(got.is_some());
    }

    #[tokio::test]
    async fn job_lock_conflict_on_overlapping_regions() {
        let store = InMemoryStore::new();
        let t = TenantName::new("T1");
        let lock = JobLock {
            holder_job_id: JobId::new("job-1"),
            regions: vec!["us-east-1".into()],
            platform_id: None,
        };
        store.acquire_job_lock(&t, lock).await.unwrap();

        let lock2 = JobLock {
            holder_job_id: JobId::new("job-2"),
            regions: vec!["us-east-1".into(), "eu-west-1".into()],
            platform_id: None,
        };
        let err = store.acquire_job_lock(&t, lock2).await.unwrap_err();
        match err {
            StoreError::LockConflict { holder } => assert_eq!(holder, "job-1"),
            other => panic!("expected LockConflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn job_lock_released_then_reacquirable() {
        let store = InMemoryStore::new();
        let t = TenantName::new("T1");
        let lock = JobLock {
            holder_job_id: JobId::new("job-1"),
            regions: vec!["us-east-1".into()],
            platform_id: None,
        };
        store.acquire_job_lock(&t, lock).await.unwrap();
        store.release_job_lock(&t).await.unwrap();

        let lock2 = JobLock {
            holder_job_id: JobId::new("job-2"),
            regions: vec!["us-east-1".into()],
            platform_id: None,
        };
        store.acquire_job_lock(&t, lock2).await.unwrap();
    }

    #[tokio::test]
    async fn events_since_cursor_sorted_ascending() {
        let store = InMemoryStore::new();
        for (ts, partition) in [(15.0, 0), (10.0, 1), (12.0, 0)] {
            store
                .append_event(&Event {
                    partition,
                    timestamp: ts,
                    vendor: rse_domain::EventVendor::Aws,
                    events: vec![],
                    ttl: Some(Utc::now()),
                })
                .await
                .unwrap();
        }
        let part0 = store.list_events_since(0, 0.0, 10).await.unwrap();
        assert_eq!(part0.iter().map(|e| e.timestamp).collect::<Vec<_>>(), vec![12.0, 15.0]);
    }

    #[tokio::test]
    async fn scheduled_job_name_unique_per_customer() {
        let store = InMemoryStore::new();
        let job = ScheduledJob {
            name: "nightly".into(),
            customer: "C1".into(),
            tenant: TenantName::new("T1"),
            job_type: rse_domain::ScheduledJobType::Standard,
            schedule: "0 0 * * *".into(),
            meta: Default::default(),
            enabled: true,
        };
        store.upsert_scheduled_job(&job).await.unwrap();

        let conflicting = ScheduledJob { tenant: TenantName::new("T2"), ..job.clone() };
        let err = store.upsert_scheduled_job(&conflicting).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }
}
