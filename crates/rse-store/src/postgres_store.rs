use async_trait::async_trait;
use sqlx::PgPool;

use rse_domain::{
    BatchResults, BatchResultsId, Cloud, CustomerName, Event, Job, JobId, License, LicenseKey,
    ResourceException, ResourceExceptionId, Rule, RuleSource, RuleSourceId, Ruleset, RulesetId,
    RulesetVersion, ScheduledJob, Tenant, TenantName,
};

use crate::error::StoreError;
use crate::lock::JobLock;
use crate::store::Store;

// DDL — idempotent; run at every startup via migrate(). JSONB columns carry
// the full entity; narrow indexed columns exist only where the admission/
// dispatch path needs a lookup key.
const MIGRATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS tenants (
    name  TEXT PRIMARY KEY,
    state JSONB NOT NULL
);

CREATE TABLE IF NOT EXISTS licenses (
    license_key TEXT PRIMARY KEY,
    state       JSONB NOT NULL
);

CREATE TABLE IF NOT EXISTS rules (
    customer TEXT NOT NULL,
    name     TEXT NOT NULL,
    cloud    TEXT NOT NULL,
    state    JSONB NOT NULL,
    PRIMARY KEY (customer, name)
);
CREATE INDEX IF NOT EXISTS idx_rules_customer_cloud ON rules (customer, cloud);

CREATE TABLE IF NOT EXISTS rule_sources (
    id    TEXT PRIMARY KEY,
    state JSONB NOT NULL
);

CREATE TABLE IF NOT EXISTS rulesets (
    customer   TEXT NOT NULL,
    name       TEXT NOT NULL,
    version    TEXT NOT NULL,
    ruleset_id TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    state      JSONB NOT NULL,
    PRIMARY KEY (customer, name, version)
);
CREATE INDEX IF NOT EXISTS idx_rulesets_id ON rulesets (ruleset_id);

CREATE TABLE IF NOT EXISTS jobs (
    id          TEXT PRIMARY KEY,
    tenant_name TEXT NOT NULL,
    state       JSONB NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_jobs_tenant ON jobs (tenant_name);

CREATE TABLE IF NOT EXISTS batch_results (
    id    TEXT PRIMARY KEY,
    state JSONB NOT NULL
);

CREATE TABLE IF NOT EXISTS events (
    seq       BIGSERIAL PRIMARY KEY,
    partition INTEGER NOT NULL,
    ts        DOUBLE PRECISION NOT NULL,
    state     JSONB NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_events_partition_ts ON events (partition, ts);

CREATE TABLE IF NOT EXISTS settings (
    key   TEXT PRIMARY KEY,
    value JSONB NOT NULL
);

CREATE TABLE IF NOT EXISTS scheduled_jobs (
    customer TEXT NOT NULL,
    name     TEXT NOT NULL,
    tenant   TEXT NOT NULL,
    state    JSONB NOT NULL,
    PRIMARY KEY (customer, name)
);

CREATE TABLE IF NOT EXISTS resource_exceptions (
    id       TEXT PRIMARY KEY,
    customer TEXT NOT NULL,
    tenant   TEXT,
    state    JSONB NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_exceptions_customer_tenant ON resource_exceptions (customer, tenant);

CREATE TABLE IF NOT EXISTS job_locks (
    tenant TEXT PRIMARY KEY,
    state  JSONB NOT NULL
);
"#;

/// Persistent [`Store`] backed by PostgreSQL. Tables are created on first
/// connect via [`PostgresStore::connect`], which runs `migrate` before
/// returning.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(url)
            .await
            .map_err(|e| StoreError::Internal(format!("postgres connect: {e}")))?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(MIGRATIONS)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Internal(format!("migration: {e}")))?;
        Ok(())
    }
}

fn to_json<T: serde::Serialize>(v: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(v).map_err(StoreError::Serialization)
}

fn from_json<T: serde::de::DeserializeOwned>(v: serde_json::Value) -> Result<T, StoreError> {
    serde_json::from_value(v).map_err(StoreError::Serialization)
}

#[async_trait]
impl Store for PostgresStore {
    async fn get_tenant(&self, name: &TenantName) -> Result<Option<Tenant>, StoreError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT state FROM tenants WHERE name = $1")
                .bind(name.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.to_string()))?;
        row.map(|(v,)| from_json(v)).transpose()
    }

    async fn upsert_tenant(&self, tenant: &Tenant) -> Result<(), StoreError> {
        let json = to_json(tenant)?;
        sqlx::query(
            "INSERT INTO tenants (name, state) VALUES ($1, $2::jsonb)
             ON CONFLICT (name) DO UPDATE SET state = EXCLUDED.state",
        )
        .bind(tenant.name.as_str())
        .bind(&json)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn find_tenant_by_cloud_project(
        &self,
        cloud: Cloud,
        project: &str,
    ) -> Result<Option<Tenant>, StoreError> {
        let rows: Vec<(serde_json::Value,)> = sqlx::query_as(
            "SELECT state FROM tenants WHERE state->>'cloud' = $1 AND state->>'project' = $2",
        )
        .bind(cloud.to_string())
        .bind(project)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?;
        rows.into_iter().map(|(v,)| from_json(v)).next().transpose()
    }

    async fn get_license(&self, key: &LicenseKey) -> Result<Option<License>, StoreError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT state FROM licenses WHERE license_key = $1")
                .bind(key.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.to_string()))?;
        row.map(|(v,)| from_json(v)).transpose()
    }

    async fn list_licenses_for_customer(&self, customer: &CustomerName) -> Result<Vec<License>, StoreError> {
        let rows: Vec<(serde_json::Value,)> =
            sqlx::query_as("SELECT state FROM licenses WHERE state->'customers' ? $1")
                .bind(customer.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.to_string()))?;
        rows.into_iter().map(|(v,)| from_json(v)).collect()
    }

    async fn upsert_license(&self, license: &License) -> Result<(), StoreError> {
        let json = to_json(license)?;
        sqlx::query(
            "INSERT INTO licenses (license_key, state) VALUES ($1, $2::jsonb)
             ON CONFLICT (license_key) DO UPDATE SET state = EXCLUDED.state",
        )
        .bind(license.license_key.as_str())
        .bind(&json)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn get_rule(&self, customer: &CustomerName, name: &str) -> Result<Option<Rule>, StoreError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT state FROM rules WHERE customer = $1 AND name = $2")
                .bind(customer.as_str())
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.to_string()))?;
        row.map(|(v,)| from_json(v)).transpose()
    }

    async fn list_rules_for_customer_cloud(
        &self,
        customer: &CustomerName,
        cloud: Cloud,
    ) -> Result<Vec<Rule>, StoreError> {
        let rows: Vec<(serde_json::Value,)> =
            sqlx::query_as("SELECT state FROM rules WHERE customer = $1 AND cloud = $2")
                .bind(customer.as_str())
                .bind(cloud.to_string())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.to_string()))?;
        rows.into_iter().map(|(v,)| from_json(v)).collect()
    }

    async fn upsert_rule(&self, rule: &Rule) -> Result<(), StoreError> {
        let json = to_json(rule)?;
        sqlx::query(
            "INSERT INTO rules (customer, name, cloud, state) VALUES ($1, $2, $3, $4::jsonb)
             ON CONFLICT (customer, name) DO UPDATE SET cloud = EXCLUDED.cloud, state = EXCLUDED.state",
        )
        .bind(rule.customer.as_str())
        .bind(&rule.name)
        .bind(rule.cloud.to_string())
        .bind(&json)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn get_rule_source(&self, id: &RuleSourceId) -> Result<Option<RuleSource>, StoreError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT state FROM rule_sources WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.to_string()))?;
        row.map(|(v,)| from_json(v)).transpose()
    }

    async fn upsert_rule_source(&self, source: &RuleSource) -> Result<(), StoreError> {
        let json = to_json(source)?;
        sqlx::query(
            "INSERT INTO rule_sources (id, state) VALUES ($1, $2::jsonb)
             ON CONFLICT (id) DO UPDATE SET state = EXCLUDED.state",
        )
        .bind(source.id.as_str())
        .bind(&json)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn get_ruleset(
        &self,
        customer: &CustomerName,
        name: &str,
        version: &RulesetVersion,
    ) -> Result<Option<Ruleset>, StoreError> {
        let row: Option<(serde_json::Value,)> = sqlx::query_as(
            "SELECT state FROM rulesets WHERE customer = $1 AND name = $2 AND version = $3",
        )
        .bind(customer.as_str())
        .bind(name)
        .bind(version.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?;
        row.map(|(v,)| from_json(v)).transpose()
    }

    async fn get_ruleset_by_id(&self, id: &RulesetId) -> Result<Option<Ruleset>, StoreError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT state FROM rulesets WHERE ruleset_id = $1 LIMIT 1")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.to_string()))?;
        row.map(|(v,)| from_json(v)).transpose()
    }

    async fn get_latest_ruleset(
        &self,
        customer: &CustomerName,
        name: &str,
    ) -> Result<Option<Ruleset>, StoreError> {
        let row: Option<(serde_json::Value,)> = sqlx::query_as(
            "SELECT state FROM rulesets WHERE customer = $1 AND name = $2
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(customer.as_str())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?;
        row.map(|(v,)| from_json(v)).transpose()
    }

    async fn list_ruleset_versions(
        &self,
        customer: &CustomerName,
        name: &str,
    ) -> Result<Vec<Ruleset>, StoreError> {
        let rows: Vec<(serde_json::Value,)> = sqlx::query_as(
            "SELECT state FROM rulesets WHERE customer = $1 AND name = $2 ORDER BY created_at",
        )
        .bind(customer.as_str())
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?;
        rows.into_iter().map(|(v,)| from_json(v)).collect()
    }

    async fn upsert_ruleset(&self, ruleset: &Ruleset) -> Result<(), StoreError> {
        let json = to_json(ruleset)?;
        sqlx::query(
            "INSERT INTO rulesets (customer, name, version, ruleset_id, created_at, state)
             VALUES ($1, $2, $3, $4, $5, $6::jsonb)
             ON CONFLICT (customer, name, version)
             DO UPDATE SET ruleset_id = EXCLUDED.ruleset_id, state = EXCLUDED.state",
        )
        .bind(ruleset.customer.as_str())
        .bind(&ruleset.name)
        .bind(ruleset.version.to_string())
        .bind(ruleset.id.as_str())
        .bind(ruleset.created_at)
        .bind(&json)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn delete_ruleset(
        &self,
        customer: &CustomerName,
        name: &str,
        version: Option<&RulesetVersion>,
    ) -> Result<(), StoreError> {
        match version {
            Some(v) => {
                sqlx::query("DELETE FROM rulesets WHERE customer = $1 AND name = $2 AND version = $3")
                    .bind(customer.as_str())
                    .bind(name)
                    .bind(v.to_string())
                    .execute(&self.pool)
                    .await
                    .map_err(|e| StoreError::Internal(e.to_string()))?;
            }
            None => {
                sqlx::query("DELETE FROM rulesets WHERE customer = $1 AND name = $2")
                    .bind(customer.as_str())
                    .bind(name)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| StoreError::Internal(e.to_string()))?;
            }
        }
        Ok(())
    }

    async fn get_job(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT state FROM jobs WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.to_string()))?;
        row.map(|(v,)| from_json(v)).transpose()
    }

    async fn upsert_job(&self, job: &Job) -> Result<(), StoreError> {
        let json = to_json(job)?;
        sqlx::query(
            "INSERT INTO jobs (id, tenant_name, state) VALUES ($1, $2, $3::jsonb)
             ON CONFLICT (id) DO UPDATE SET state = EXCLUDED.state",
        )
        .bind(job.id.as_str())
        .bind(job.tenant_name.as_str())
        .bind(&json)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn list_jobs_for_tenant(&self, tenant: &TenantName) -> Result<Vec<Job>, StoreError> {
        let rows: Vec<(serde_json::Value,)> =
            sqlx::query_as("SELECT state FROM jobs WHERE tenant_name = $1")
                .bind(tenant.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.to_string()))?;
        rows.into_iter().map(|(v,)| from_json(v)).collect()
    }

    async fn get_batch_results(&self, id: &BatchResultsId) -> Result<Option<BatchResults>, StoreError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT state FROM batch_results WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.to_string()))?;
        row.map(|(v,)| from_json(v)).transpose()
    }

    async fn upsert_batch_results(&self, batch: &BatchResults) -> Result<(), StoreError> {
        let json = to_json(batch)?;
        sqlx::query(
            "INSERT INTO batch_results (id, state) VALUES ($1, $2::jsonb)
             ON CONFLICT (id) DO UPDATE SET state = EXCLUDED.state",
        )
        .bind(batch.id.as_str())
        .bind(&json)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn append_event(&self, event: &Event) -> Result<(), StoreError> {
        let json = to_json(event)?;
        sqlx::query("INSERT INTO events (partition, ts, state) VALUES ($1, $2, $3::jsonb)")
            .bind(event.partition as i32)
            .bind(event.timestamp)
            .bind(&json)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn list_events_since(
        &self,
        partition: u32,
        since: f64,
        limit: u32,
    ) -> Result<Vec<Event>, StoreError> {
        let rows: Vec<(serde_json::Value,)> = sqlx::query_as(
            "SELECT state FROM events WHERE partition = $1 AND ts > $2 ORDER BY ts ASC LIMIT $3",
        )
        .bind(partition as i32)
        .bind(since)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?;
        rows.into_iter().map(|(v,)| from_json(v)).collect()
    }

    async fn delete_events_up_to(&self, cursor: f64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM events WHERE ts <= $1")
            .bind(cursor)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn get_event_cursor(&self) -> Result<f64, StoreError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT value FROM settings WHERE key = 'event_cursor'")
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(row.and_then(|(v,)| v.as_f64()).unwrap_or(0.0))
    }

    async fn set_event_cursor(&self, cursor: f64) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES ('event_cursor', $1::jsonb)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(serde_json::json!(cursor))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn get_scheduled_job(&self, customer: &str, name: &str) -> Result<Option<ScheduledJob>, StoreError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT state FROM scheduled_jobs WHERE customer = $1 AND name = $2")
                .bind(customer)
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.to_string()))?;
        row.map(|(v,)| from_json(v)).transpose()
    }

    async fn list_scheduled_jobs_for_tenant(&self, tenant: &TenantName) -> Result<Vec<ScheduledJob>, StoreError> {
        let rows: Vec<(serde_json::Value,)> =
            sqlx::query_as("SELECT state FROM scheduled_jobs WHERE tenant = $1")
                .bind(tenant.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.to_string()))?;
        rows.into_iter().map(|(v,)| from_json(v)).collect()
    }

    async fn upsert_scheduled_job(&self, job: &ScheduledJob) -> Result<(), StoreError> {
        let json = to_json(job)?;
        let existing: Option<(String,)> = sqlx::query_as(
            "SELECT tenant FROM scheduled_jobs WHERE customer = $1 AND name = $2",
        )
        .bind(&job.customer)
        .bind(&job.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?;
        if let Some((tenant,)) = existing {
            if tenant != job.tenant.as_str() {
                return Err(StoreError::Duplicate(format!(
                    "scheduled job '{}' already exists for customer '{}'",
                    job.name, job.customer
                )));
            }
        }
        sqlx::query(
            "INSERT INTO scheduled_jobs (customer, name, tenant, state) VALUES ($1, $2, $3, $4::jsonb)
             ON CONFLICT (customer, name) DO UPDATE SET tenant = EXCLUDED.tenant, state = EXCLUDED.state",
        )
        .bind(&job.customer)
        .bind(&job.name)
        .bind(job.tenant.as_str())
        .bind(&json)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn delete_scheduled_job(&self, customer: &str, name: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM scheduled_jobs WHERE customer = $1 AND name = $2")
            .bind(customer)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn list_exceptions(
        &self,
        customer: &str,
        tenant: Option<&TenantName>,
    ) -> Result<Vec<ResourceException>, StoreError> {
        let rows: Vec<(serde_json::Value,)> = match tenant {
            Some(t) => sqlx::query_as(
                "SELECT state FROM resource_exceptions WHERE customer = $1 AND (tenant = $2 OR tenant IS NULL)",
            )
            .bind(customer)
            .bind(t.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Internal(e.to_string()))?,
            None => sqlx::query_as("SELECT state FROM resource_exceptions WHERE customer = $1")
                .bind(customer)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.to_string()))?,
        };
        rows.into_iter().map(|(v,)| from_json(v)).collect()
    }

    async fn upsert_exception(&self, exception: &ResourceException) -> Result<(), StoreError> {
        let json = to_json(exception)?;
        sqlx::query(
            "INSERT INTO resource_exceptions (id, customer, tenant, state) VALUES ($1, $2, $3, $4::jsonb)
             ON CONFLICT (id) DO UPDATE SET state = EXCLUDED.state",
        )
        .bind(exception.id.as_str())
        .bind(&exception.customer)
        .bind(exception.tenant.as_ref().map(|t| t.as_str()))
        .bind(&json)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn delete_exception(&self, id: &ResourceExceptionId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM resource_exceptions WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn get_job_lock(&self, tenant: &TenantName) -> Result<Option<JobLock>, StoreError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT state FROM job_locks WHERE tenant = $1")
                .bind(tenant.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.to_string()))?;
        row.map(|(v,)| from_json(v)).transpose()
    }

    async fn acquire_job_lock(&self, tenant: &TenantName, lock: JobLock) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO job_locks (tenant, state) VALUES ($1, $2::jsonb) ON CONFLICT DO NOTHING",
        )
        .bind(tenant.as_str())
        .bind(to_json(&lock)?)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?;

        if result.rows_affected() == 0 {
            let existing = self.get_job_lock(tenant).await?.ok_or_else(|| {
                StoreError::Internal("job lock vanished between insert and read".into())
            })?;
            if existing.intersects(&lock.regions, lock.platform_id.as_deref()) {
                return Err(StoreError::LockConflict { holder: existing.holder_job_id.to_string() });
            }
            // Disjoint claim against a live lock row from a different job — merge.
            sqlx::query("UPDATE job_locks SET state = $2::jsonb WHERE tenant = $1")
                .bind(tenant.as_str())
                .bind(to_json(&lock)?)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Internal(e.to_string()))?;
        }
        Ok(())
    }

    async fn release_job_lock(&self, tenant: &TenantName) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM job_locks WHERE tenant = $1")
            .bind(tenant.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(())
    }

    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        self.migrate().await
    }
}

// Gated behind TEST_POSTGRES_URL; skipped when no test database is configured.
#[cfg(test)]
mod tests {
    use super::*;

    fn test_url() -> Option<String> {
        std::env::var("TEST_POSTGRES_URL").ok()
    }

    #[tokio::test]
    #[ignore = "requires TEST_POSTGRES_URL"]
    async fn upsert_and_get_tenant() {
        let url = test_url().unwrap();
        let store = PostgresStore::connect(&url).await.unwrap();
        let tenant = Tenant {
            name: TenantName::new("pg-test-tenant"),
            customer: CustomerName::new("C1"),
            cloud: Cloud::Aws,
            project: "acct-1".into(),
            active_regions: vec!["us-east-1".into()],
            is_active: true,
        };
        store.upsert_tenant(&tenant).await.unwrap();
        let fetched = store.get_tenant(&tenant.name).await.unwrap().unwrap();
        assert_eq!(fetched.name, tenant.name);
    }

    #[tokio::test]
    #[ignore = "requires TEST_POSTGRES_URL"]
    async fn job_lock_conflict() {
        let url = test_url().unwrap();
        let store = PostgresStore::connect(&url).await.unwrap();
        let tenant = TenantName::new("pg-test-lock-tenant");

        store
            .acquire_job_lock(
                &tenant,
                JobLock { holder_job_id: JobId::new("job-aaa"), regions: vec!["us-east-1".into()], platform_id: None },
            )
            .await
            .unwrap();

        let err = store
            .acquire_job_lock(
                &tenant,
                JobLock { holder_job_id: JobId::new("job-bbb"), regions: vec!["us-east-1".into()], platform_id: None },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::LockConflict { .. }));

        store.release_job_lock(&tenant).await.unwrap();
    }
}
