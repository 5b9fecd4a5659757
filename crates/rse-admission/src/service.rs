use std::sync::Arc;

use chrono::{Duration, Utc};
use rse_config::Settings;
use rse_domain::{Cloud, CustomerName, Job, JobId, JobStatus, LicenseKey, TenantName};
use rse_licensing::LicenseView;
use rse_store::{JobLock, Store, StoreError};
use uuid::Uuid;

use crate::env::{build_job_env, ExecutorJobType};
use crate::error::AdmissionError;
use crate::executor::ExecutorRegistry;
use crate::license_manager::LicenseManagerClient;
use crate::region::resolve_regions;
use crate::ruleset_resolution::{resolve_rules_to_scan, resolve_rulesets, RulesetNameInput};
use crate::secret::{SecretStore, CREDENTIALS_TTL_SECONDS};

/// Cloud account/project id the caller already resolved out-of-band (e.g.
/// via STS `GetCallerIdentity` for AWS, or by inspecting the credentials
/// JSON for GCP) — compared against `tenant.project` as an optional
/// cloud-identifier verification step.
pub struct CredentialsPayload {
    pub ciphertext: String,
    pub resolved_cloud_identifier: Option<String>,
}

pub struct SubmitJobRequest {
    pub tenant: TenantName,
    /// `None` means the caller is unrestricted (e.g. a system/scheduled
    /// submission); `Some` lists the tenants this caller may act on.
    pub accessible_tenants: Option<Vec<TenantName>>,
    pub regions: Vec<String>,
    pub license_key: Option<LicenseKey>,
    pub rulesets: Vec<RulesetNameInput>,
    pub rules_to_scan: Vec<String>,
    pub credentials: Option<CredentialsPayload>,
    pub platform_id: Option<String>,
    pub scheduled_job_name: Option<String>,
}

pub struct AdmissionService {
    store: Arc<dyn Store>,
    license_view: Arc<LicenseView>,
    license_manager: Arc<dyn LicenseManagerClient>,
    secrets: Arc<dyn SecretStore>,
    executors: Arc<ExecutorRegistry>,
    settings: Settings,
}

impl AdmissionService {
    pub fn new(
        store: Arc<dyn Store>,
        license_view: Arc<LicenseView>,
        license_manager: Arc<dyn LicenseManagerClient>,
        secrets: Arc<dyn SecretStore>,
        executors: Arc<ExecutorRegistry>,
        settings: Settings,
    ) -> Self {
        Self { store, license_view, license_manager, secrets, executors, settings }
    }

    /// Runs every admission precondition in order, persists the Job,
    /// submits it to the executor, and acquires the tenant job lock.
    pub async fn submit_job(
        &self,
        customer: &CustomerName,
        req: SubmitJobRequest,
    ) -> Result<Job, AdmissionError> {
        // 1. Tenant exists, is active, and is accessible to the caller.
        let tenant = self
            .store
            .get_tenant(&req.tenant)
            .await?
            .ok_or_else(|| AdmissionError::TenantNotFound(req.tenant.to_string()))?;
        if !tenant.is_active {
            return Err(AdmissionError::TenantNotFound(req.tenant.to_string()));
        }
        if let Some(allowed) = &req.accessible_tenants {
            if !allowed.iter().any(|t| t == &tenant.name) {
                return Err(AdmissionError::TenantNotAllowed(tenant.name.to_string()));
            }
        }

        // 2. Cloud is one of the closed set — guaranteed by `Tenant.cloud`'s
        // type, so there's nothing further to validate here.
        let _: Cloud = tenant.cloud;

        // 3. Region resolution.
        let regions = resolve_regions(&tenant, &req.regions)?;

        // 4. Job lock pre-check. The job id is minted now so the lock row
        // written at the end of this method and the one checked here agree;
        // the actual write happens only once every precondition has passed.
        let job_id = JobId::new(Uuid::new_v4().to_string());
        if let Some(existing) = self.store.get_job_lock(&tenant.name).await? {
            if existing.intersects(&regions, req.platform_id.as_deref()) {
                return Err(AdmissionError::LockConflict { holder: existing.holder_job_id.to_string() });
            }
        }

        // 5. Credentials.
        let mut credentials_key = None;
        if let Some(credentials) = &req.credentials {
            if let Some(resolved) = &credentials.resolved_cloud_identifier {
                if resolved != &tenant.project {
                    return Err(AdmissionError::CredentialsMismatch {
                        resolved: resolved.clone(),
                        expected: tenant.project.clone(),
                    });
                }
            }
            let key = job_id.to_string();
            self.secrets.put(&key, &credentials.ciphertext, CREDENTIALS_TTL_SECONDS).await;
            credentials_key = Some(key);
        }

        // 6. Ruleset resolution.
        let resolved = resolve_rulesets(
            self.store.as_ref(),
            &self.license_view,
            customer,
            &tenant,
            req.license_key.as_ref(),
            &req.rulesets,
        )
        .await?;

        if let Some(tlk) = &resolved.affected_tenant_license_key {
            let allowed = self.license_manager.check_permission(customer, &tenant.name, tlk).await?;
            if !allowed {
                return Err(AdmissionError::PermissionDenied(tlk.to_string()));
            }
        }

        // 7. rules_to_scan intersection.
        let rules_to_scan = if req.rules_to_scan.is_empty() {
            None
        } else {
            Some(resolve_rules_to_scan(&resolved.rulesets, &req.rules_to_scan)?)
        };

        // Persistence & dispatch.
        let now = Utc::now();
        let mut job = Job {
            id: job_id.clone(),
            tenant_name: tenant.name.clone(),
            customer: customer.to_string(),
            cloud: tenant.cloud,
            regions: regions.clone(),
            rulesets: resolved.names,
            rules_to_scan,
            status: JobStatus::Pending,
            submitted_at: now,
            batch_job_id: None,
            credentials_key,
            affected_license: resolved.affected_license,
            platform_id: req.platform_id.clone(),
            ttl: self.settings.job_ttl_minutes.map(|m| now + Duration::minutes(i64::from(m))),
            reason: None,
            scheduled_job_name: req.scheduled_job_name,
        };
        self.store.upsert_job(&job).await?;

        let job_type =
            if job.scheduled_job_name.is_some() { ExecutorJobType::Scheduled } else { ExecutorJobType::Standard };
        let env = build_job_env(&self.settings, &job, job_type, &[]);
        let executor = self.executors.for_mode(self.settings.deployment_mode)?;
        let executor_job_id = executor.submit_batch(&env).await?;
        job.batch_job_id = Some(executor_job_id);
        self.store.upsert_job(&job).await?;

        let lock = JobLock { holder_job_id: job.id.clone(), regions, platform_id: req.platform_id };
        match self.store.acquire_job_lock(&tenant.name, lock).await {
            Ok(()) => {}
            Err(StoreError::LockConflict { holder }) => return Err(AdmissionError::LockConflict { holder }),
            Err(e) => return Err(e.into()),
        }

        Ok(job)
    }

    /// Terminates a job; only allowed while it is not yet in a terminal
    /// state.
    pub async fn terminate_job(&self, id: &JobId) -> Result<Job, AdmissionError> {
        let mut job =
            self.store.get_job(id).await?.ok_or_else(|| AdmissionError::JobNotFound(id.to_string()))?;
        if job.status.is_terminal() {
            return Err(AdmissionError::AlreadyTerminal(id.to_string()));
        }

        if let Some(executor_job_id) = &job.batch_job_id {
            let executor = self.executors.for_mode(self.settings.deployment_mode)?;
            executor.terminate(executor_job_id).await?;
        }

        job.terminate("Initiated by user via job termination request");
        self.store.upsert_job(&job).await?;
        self.store.release_job_lock(&job.tenant_name).await?;
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rse_domain::{Cloud, Tenant};
    use rse_store::InMemoryStore;

    use crate::executor::InMemoryExecutor;
    use crate::license_manager::AllowAllLicenseManagerClient;
    use crate::secret::InMemorySecretStore;

    fn settings() -> Settings {
        Settings {
            deployment_mode: rse_config::DeploymentMode::Server,
            buckets: rse_config::BucketNames {
                rulesets: "rulesets".into(),
                reports: "reports".into(),
                recommendations: "recs".into(),
            },
            aws_region: "us-east-1".into(),
            event_partitions: 10,
            job_ttl_minutes: Some(180),
            batch_job_lifetime_minutes: 180,
            batch_job_log_level: "INFO".into(),
            system_customer_name: "SYSTEM".into(),
            aws_shard_count: 2,
            min_core_version: "1.0.0".into(),
            current_core_version: "1.2.0".into(),
            deployment_account_id: None,
        }
    }

    async fn service_with(store: Arc<dyn Store>) -> AdmissionService {
        let mut executors = ExecutorRegistry::new();
        executors.register(rse_config::DeploymentMode::Server, Box::new(InMemoryExecutor::new()));
        AdmissionService::new(
            store.clone(),
            Arc::new(LicenseView::new(store)),
            Arc::new(AllowAllLicenseManagerClient),
            Arc::new(InMemorySecretStore::new()),
            Arc::new(executors),
            settings(),
        )
    }

    async fn seed_tenant(store: &dyn Store) -> Tenant {
        let tenant = Tenant {
            name: TenantName::new("T1"),
            customer: CustomerName::new("C1"),
            cloud: Cloud::Aws,
            project: "acct-1".into(),
            active_regions: vec!["us-east-1".into(), "eu-west-1".into()],
            is_active: true,
        };
        store.upsert_tenant(&tenant).await.unwrap();
        tenant
    }

    fn ruleset(name: &str) -> rse_domain::Ruleset {
        rse_domain::Ruleset {
            id: rse_domain::RulesetId::new(format!("{name}-1.0.0")),
            customer: CustomerName::new("C1"),
            name: name.into(),
            version: rse_domain::RulesetVersion::parse("1.0.0").unwrap(),
            cloud: Cloud::Aws,
            description: None,
            display_name: None,
            rules: vec!["ecc-aws-001-x".into()],
            licensed: false,
            event_driven: false,
            s3_path: rse_domain::S3Path { bucket: "rulesets".into(), key: "k".into() },
            license_keys: std::collections::HashSet::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn submit_job_with_local_ruleset_name_succeeds() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        seed_tenant(store.as_ref()).await;
        store.upsert_ruleset(&ruleset("RS-CORE")).await.unwrap();
        let service = service_with(store.clone()).await;

        let req = SubmitJobRequest {
            tenant: TenantName::new("T1"),
            accessible_tenants: None,
            regions: vec![],
            license_key: None,
            rulesets: vec![RulesetNameInput { name: "RS-CORE".into(), version: None }],
            rules_to_scan: vec![],
            credentials: None,
            platform_id: None,
            scheduled_job_name: None,
        };
        let job = service.submit_job(&CustomerName::new("C1"), req).await.unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.batch_job_id.is_some());
        assert_eq!(job.regions, vec!["us-east-1".to_string(), "eu-west-1".to_string()]);

        let lock = store.get_job_lock(&TenantName::new("T1")).await.unwrap();
        assert!(lock.is_some());
    }

    #[tokio::test]
    async fn submit_job_rejects_caller_without_tenant_access() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        seed_tenant(store.as_ref()).await;
        let service = service_with(store.clone()).await;

        let req = SubmitJobRequest {
            tenant: TenantName::new("T1"),
            accessible_tenants: Some(vec![TenantName::new("OTHER")]),
            regions: vec![],
            license_key: None,
            rulesets: vec![RulesetNameInput { name: "RS-CORE".into(), version: None }],
            rules_to_scan: vec![],
            credentials: None,
            platform_id: None,
            scheduled_job_name: None,
        };
        let err = service.submit_job(&CustomerName::new("C1"), req).await.unwrap_err();
        assert!(matches!(err, AdmissionError::TenantNotAllowed(_)));
    }

    #[tokio::test]
    async fn submit_job_conflicting_region_lock_is_forbidden() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        seed_tenant(store.as_ref()).await;
        store.upsert_ruleset(&ruleset("RS-CORE")).await.unwrap();
        store
            .acquire_job_lock(
                &TenantName::new("T1"),
                JobLock { holder_job_id: JobId::new("holder"), regions: vec!["us-east-1".into()], platform_id: None },
            )
            .await
            .unwrap();
        let service = service_with(store.clone()).await;

        let req = SubmitJobRequest {
            tenant: TenantName::new("T1"),
            accessible_tenants: None,
            regions: vec!["us-east-1".into()],
            license_key: None,
            rulesets: vec![RulesetNameInput { name: "RS-CORE".into(), version: None }],
            rules_to_scan: vec![],
            credentials: None,
            platform_id: None,
            scheduled_job_name: None,
        };
        let err = service.submit_job(&CustomerName::new("C1"), req).await.unwrap_err();
        assert!(matches!(err, AdmissionError::LockConflict { .. }));
    }

    #[tokio::test]
    async fn terminate_job_releases_lock_and_sets_failed() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        seed_tenant(store.as_ref()).await;
        store.upsert_ruleset(&ruleset("RS-CORE")).await.unwrap();
        let service = service_with(store.clone()).await;

        let req = SubmitJobRequest {
            tenant: TenantName::new("T1"),
            accessible_tenants: None,
            regions: vec![],
            license_key: None,
            rulesets: vec![RulesetNameInput { name: "RS-CORE".into(), version: None }],
            rules_to_scan: vec![],
            credentials: None,
            platform_id: None,
            scheduled_job_name: None,
        };
        let job = service.submit_job(&CustomerName::new("C1"), req).await.unwrap();

        let terminated = service.terminate_job(&job.id).await.unwrap();
        assert_eq!(terminated.status, JobStatus::Failed);
        assert!(store.get_job_lock(&TenantName::new("T1")).await.unwrap().is_none());

        let err = service.terminate_job(&job.id).await.unwrap_err();
        assert!(matches!(err, AdmissionError::AlreadyTerminal(_)));
    }
}
