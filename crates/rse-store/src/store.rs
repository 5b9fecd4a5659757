use async_trait::async_trait;

use rse_domain::{
    BatchResultsId, CustomerName, Event, JobId, License, LicenseKey, ResourceException,
    ResourceExceptionId, Rule, RuleSource, RuleSourceId, Ruleset, RulesetId, RulesetVersion,
    ScheduledJob, TenantName,
};
use rse_domain::{BatchResults, Job};

use crate::error::StoreError;
use crate::lock::JobLock;

/// Persistence for every tenant-owned entity, plus the tenant job lock and
/// the event-assembler cursor.
///
/// One implementation per deployment shape: [`crate::memory::InMemoryStore`]
/// for tests and local dev, [`crate::postgres_store::PostgresStore`] for
/// production.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    // ── Tenants ──────────────────────────────────────────────────────────
    async fn get_tenant(&self, name: &TenantName) -> Result<Option<rse_domain::Tenant>, StoreError>;
    async fn upsert_tenant(&self, tenant: &rse_domain::Tenant) -> Result<(), StoreError>;
    /// Reverse lookup by cloud account/subscription/project id — the event
    /// assembler's AWS tenant resolution step has no tenant name to key on,
    /// only the account id carried in the event.
    async fn find_tenant_by_cloud_project(
        &self,
        cloud: rse_domain::Cloud,
        project: &str,
    ) -> Result<Option<rse_domain::Tenant>, StoreError>;

    // ── Licenses ─────────────────────────────────────────────────────────
    async fn get_license(&self, key: &LicenseKey) -> Result<Option<License>, StoreError>;
    async fn list_licenses_for_customer(&self, customer: &CustomerName) -> Result<Vec<License>, StoreError>;
    async fn upsert_license(&self, license: &License) -> Result<(), StoreError>;

    // ── Rules ────────────────────────────────────────────────────────────
    async fn get_rule(&self, customer: &CustomerName, name: &str) -> Result<Option<Rule>, StoreError>;
    async fn list_rules_for_customer_cloud(
        &self,
        customer: &CustomerName,
        cloud: rse_domain::Cloud,
    ) -> Result<Vec<Rule>, StoreError>;
    async fn upsert_rule(&self, rule: &Rule) -> Result<(), StoreError>;

    // ── Rule sources ─────────────────────────────────────────────────────
    async fn get_rule_source(&self, id: &RuleSourceId) -> Result<Option<RuleSource>, StoreError>;
    async fn upsert_rule_source(&self, source: &RuleSource) -> Result<(), StoreError>;

    // ── Rulesets ─────────────────────────────────────────────────────────
    async fn get_ruleset(
        &self,
        customer: &CustomerName,
        name: &str,
        version: &RulesetVersion,
    ) -> Result<Option<Ruleset>, StoreError>;
    async fn get_ruleset_by_id(&self, id: &RulesetId) -> Result<Option<Ruleset>, StoreError>;
    async fn get_latest_ruleset(
        &self,
        customer: &CustomerName,
        name: &str,
    ) -> Result<Option<Ruleset>, StoreError>;
    async fn list_ruleset_versions(
        &self,
        customer: &CustomerName,
        name: &str,
    ) -> Result<Vec<Ruleset>, StoreError>;
    async fn upsert_ruleset(&self, ruleset: &Ruleset) -> Result<(), StoreError>;
    /// Delete one version, or every version for `(customer, name)` when
    /// `version` is `None`.
    async fn delete_ruleset(
        &self,
        customer: &CustomerName,
        name: &str,
        version: Option<&RulesetVersion>,
    ) -> Result<(), StoreError>;

    // ── Jobs ─────────────────────────────────────────────────────────────
    async fn get_job(&self, id: &JobId) -> Result<Option<Job>, StoreError>;
    async fn upsert_job(&self, job: &Job) -> Result<(), StoreError>;
    async fn list_jobs_for_tenant(&self, tenant: &TenantName) -> Result<Vec<Job>, StoreError>;

    // ── Batch results ────────────────────────────────────────────────────
    async fn get_batch_results(&self, id: &BatchResultsId) -> Result<Option<BatchResults>, StoreError>;
    async fn upsert_batch_results(&self, batch: &BatchResults) -> Result<(), StoreError>;

    // ── Events ───────────────────────────────────────────────────────────
    async fn append_event(&self, event: &Event) -> Result<(), StoreError>;
    /// Events in `partition` strictly newer than `since`, oldest first,
    /// capped at `limit`.
    async fn list_events_since(
        &self,
        partition: u32,
        since: f64,
        limit: u32,
    ) -> Result<Vec<Event>, StoreError>;
    /// Deletes events with `timestamp <= cursor`, across all partitions —
    /// the `EventRemover`'s job.
    async fn delete_events_up_to(&self, cursor: f64) -> Result<u64, StoreError>;

    // ── Event cursor ─────────────────────────────────────────────────────
    async fn get_event_cursor(&self) -> Result<f64, StoreError>;
    async fn set_event_cursor(&self, cursor: f64) -> Result<(), StoreError>;

    // ── Scheduled jobs ───────────────────────────────────────────────────
    async fn get_scheduled_job(&self, customer: &str, name: &str) -> Result<Option<ScheduledJob>, StoreError>;
    async fn list_scheduled_jobs_for_tenant(&self, tenant: &TenantName) -> Result<Vec<ScheduledJob>, StoreError>;
    async fn upsert_scheduled_job(&self, job: &ScheduledJob) -> Result<(), StoreError>;
    async fn delete_scheduled_job(&self, customer: &str, name: &str) -> Result<(), StoreError>;

    // ── Resource exceptions ──────────────────────────────────────────────
    async fn list_exceptions(
        &self,
        customer: &str,
        tenant: Option<&TenantName>,
    ) -> Result<Vec<ResourceException>, StoreError>;
    async fn upsert_exception(&self, exception: &ResourceException) -> Result<(), StoreError>;
    async fn delete_exception(&self, id: &ResourceExceptionId) -> Result<(), StoreError>;

    // ── Tenant job lock ──────────────────────────────────────────────────
    async fn get_job_lock(&self, tenant: &TenantName) -> Result<Option<JobLock>, StoreError>;
    /// Read-modify-write acquire; `StoreError::LockConflict` names the
    /// blocking job id on collision.
    async fn acquire_job_lock(&self, tenant: &TenantName, lock: JobLock) -> Result<(), StoreError>;
    async fn release_job_lock(&self, tenant: &TenantName) -> Result<(), StoreError>;

    /// Idempotent index/schema sync — backs the `create_indexes` CLI
    /// command.
    async fn ensure_indexes(&self) -> Result<(), StoreError>;
}
