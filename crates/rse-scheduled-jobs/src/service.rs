use std::sync::Arc;

use rse_admission::{resolve_regions, resolve_rulesets, RulesetNameInput};
use rse_domain::{CustomerName, ScheduledJob, ScheduledJobMeta, ScheduledJobType, TenantName};
use rse_licensing::LicenseView;
use rse_store::Store;

use crate::error::ScheduledJobError;
use crate::scheduler::CronScheduler;

#[derive(Debug, Clone)]
pub struct RegisterScheduledJobRequest {
    pub customer: String,
    pub tenant: TenantName,
    pub name: String,
    pub schedule: String,
    pub rulesets: Vec<RulesetNameInput>,
    pub regions: Vec<String>,
    pub description: Option<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateScheduledJobRequest {
    pub schedule: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
}

/// Register/list/update/delete cron-bound job definitions for a tenant,
/// sharing job admission's region and ruleset resolution so a malformed
/// schedule is rejected at registration time rather than at each fire.
pub struct ScheduledJobService {
    store: Arc<dyn Store>,
    license_view: Arc<LicenseView>,
    scheduler: Arc<dyn CronScheduler>,
}

impl ScheduledJobService {
    pub fn new(store: Arc<dyn Store>, license_view: Arc<LicenseView>, scheduler: Arc<dyn CronScheduler>) -> Self {
        Self { store, license_view, scheduler }
    }

    pub async fn register(
        &self,
        request: RegisterScheduledJobRequest,
    ) -> Result<ScheduledJob, ScheduledJobError> {
        let customer = CustomerName::new(request.customer.clone());

        if self.store.get_scheduled_job(&request.customer, &request.name).await?.is_some() {
            return Err(ScheduledJobError::Duplicate { customer: request.customer, name: request.name });
        }

        let tenant = self
            .store
            .get_tenant(&request.tenant)
            .await?
            .ok_or_else(|| ScheduledJobError::TenantNotFound(request.tenant.to_string()))?;

        // Validate once at registration — the same ruleset/region resolution
        // job admission uses — so the scheduled run itself doesn't repeat it.
        let regions = resolve_regions(&tenant, &request.regions)?;
        let resolved = resolve_rulesets(
            self.store.as_ref(),
            &self.license_view,
            &customer,
            &tenant,
            None,
            &request.rulesets,
        )
        .await?;

        let job = ScheduledJob {
            name: request.name,
            customer: request.customer,
            tenant: request.tenant,
            job_type: ScheduledJobType::Standard,
            schedule: request.schedule,
            meta: ScheduledJobMeta {
                rulesets: resolved.names.iter().map(ToString::to_string).collect(),
                regions,
            },
            enabled: request.enabled,
            description: request.description,
        };
        self.store.upsert_scheduled_job(&job).await?;
        tracing::info!(customer = %job.customer, name = %job.name, "scheduled job registered");
        Ok(job)
    }

    pub async fn get(&self, customer: &str, name: &str) -> Result<ScheduledJob, ScheduledJobError> {
        self.store
            .get_scheduled_job(customer, name)
            .await?
            .ok_or_else(|| ScheduledJobError::NotFound { customer: customer.into(), name: name.into() })
    }

    pub async fn list_for_tenant(&self, tenant: &TenantName) -> Result<Vec<ScheduledJob>, ScheduledJobError> {
        Ok(self.store.list_scheduled_jobs_for_tenant(tenant).await?)
    }

    /// `PATCH`: `enabled` toggle, description, schedule replacement.
    pub async fn update(
        &self,
        customer: &str,
        name: &str,
        request: UpdateScheduledJobRequest,
    ) -> Result<ScheduledJob, ScheduledJobError> {
        let mut job = self.get(customer, name).await?;
        if let Some(schedule) = request.schedule {
            job.schedule = schedule;
        }
        if let Some(description) = request.description {
            job.description = Some(description);
        }
        if let Some(enabled) = request.enabled {
            job.enabled = enabled;
        }
        self.store.upsert_scheduled_job(&job).await?;
        if !job.enabled {
            self.scheduler.unregister(&format!("{}/{}", job.customer, job.name)).await?;
        }
        Ok(job)
    }

    pub async fn delete(&self, customer: &str, name: &str) -> Result<(), ScheduledJobError> {
        self.get(customer, name).await?;
        self.scheduler.unregister(&format!("{customer}/{name}")).await?;
        self.store.delete_scheduled_job(customer, name).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rse_domain::{Cloud, Tenant};
    use rse_store::InMemoryStore;

    async fn seed_tenant(store: &dyn Store) {
        store
            .upsert_tenant(&Tenant {
                name: TenantName::new("T1"),
                customer: CustomerName::new("C1"),
                cloud: Cloud::Aws,
                project: "acct-1".into(),
                active_regions: vec!["us-east-1".into()],
                is_active: true,
            })
            .await
            .unwrap();
    }

    fn service(store: Arc<dyn Store>) -> ScheduledJobService {
        ScheduledJobService::new(
            store.clone(),
            Arc::new(LicenseView::new(store)),
            Arc::new(crate::scheduler::NullCronScheduler),
        )
    }

    #[tokio::test]
    async fn register_validates_regions_and_persists() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        seed_tenant(store.as_ref()).await;
        store
            .upsert_ruleset(&rse_domain::Ruleset {
                id: rse_domain::RulesetId::new("rs-1"),
                customer: CustomerName::new("C1"),
                name: "RS-CORE".into(),
                version: rse_domain::RulesetVersion::parse("1.0.0").unwrap(),
                cloud: Cloud::Aws,
                description: None,
                display_name: None,
                rules: vec!["ecc-aws-001-x".into()],
                licensed: false,
                event_driven: false,
                s3_path: rse_domain::S3Path { bucket: "b".into(), key: "k".into() },
                license_keys: Default::default(),
                created_at: chrono::Utc::now(),
            })
            .await
            .unwrap();

        let svc = service(store.clone());
        let job = svc
            .register(RegisterScheduledJobRequest {
                customer: "C1".into(),
                tenant: TenantName::new("T1"),
                name: "nightly".into(),
                schedule: "0 0 * * *".into(),
                rulesets: vec![RulesetNameInput { name: "RS-CORE".into(), version: None }],
                regions: vec!["us-east-1".into()],
                description: None,
                enabled: true,
            })
            .await
            .unwrap();
        assert_eq!(job.meta.regions, vec!["us-east-1".to_string()]);

        let err = svc
            .register(RegisterScheduledJobRequest {
                customer: "C1".into(),
                tenant: TenantName::new("T1"),
                name: "nightly".into(),
                schedule: "0 0 * * *".into(),
                rulesets: vec![RulesetNameInput { name: "RS-CORE".into(), version: None }],
                regions: vec!["us-east-1".into()],
                description: None,
                enabled: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ScheduledJobError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn update_toggles_enabled_and_schedule() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        seed_tenant(store.as_ref()).await;
        store
            .upsert_scheduled_job(&ScheduledJob {
                name: "nightly".into(),
                customer: "C1".into(),
                tenant: TenantName::new("T1"),
                job_type: ScheduledJobType::Standard,
                schedule: "0 0 * * *".into(),
                meta: ScheduledJobMeta { rulesets: vec![], regions: vec!["us-east-1".into()] },
                enabled: true,
                description: None,
            })
            .await
            .unwrap();

        let svc = service(store.clone());
        let updated = svc
            .update(
                "C1",
                "nightly",
                UpdateScheduledJobRequest { schedule: Some("0 6 * * *".into()), enabled: Some(false), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(updated.schedule, "0 6 * * *");
        assert!(!updated.enabled);
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        seed_tenant(store.as_ref()).await;
        store
            .upsert_scheduled_job(&ScheduledJob {
                name: "nightly".into(),
                customer: "C1".into(),
                tenant: TenantName::new("T1"),
                job_type: ScheduledJobType::Standard,
                schedule: "0 0 * * *".into(),
                meta: ScheduledJobMeta::default(),
                enabled: true,
                description: None,
            })
            .await
            .unwrap();

        let svc = service(store.clone());
        svc.delete("C1", "nightly").await.unwrap();
        let err = svc.get("C1", "nightly").await.unwrap_err();
        assert!(matches!(err, ScheduledJobError::NotFound { .. }));
    }
}
