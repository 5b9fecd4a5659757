use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use rse_admission::{build_event_driven_env, ExecutorRegistry};
use rse_config::Settings;
use rse_domain::{
    BatchResults, BatchResultsId, Cloud, Event, EventDrivenBatchType, EventVendor, JobStatus, RulesetId,
    TenantName,
};
use rse_event_mapping::{S3EventMappingProvider, LATEST_MAPPING_VERSION};
use rse_licensing::LicenseView;
use rse_store::Store;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::aws::{self, AwsHit};
use crate::compress::compress_region_rule_map;
use crate::dedup::dedup_stream;
use crate::error::EventAssemblerError;
use crate::maestro::{self, MaestroHit};
use crate::merge::k_way_merge;

/// Events fetched per partition per invocation.
pub const PAGE_SIZE: u32 = 500;

#[derive(Debug, Default)]
pub struct AssemblerRun {
    pub events_processed: usize,
    pub batch_results_ids: Vec<BatchResultsId>,
    pub executor_job_id: Option<String>,
}

/// Cursor-driven, N-partition, ordered event ingestion pipeline: pulls
/// partitioned audit events since a persisted cursor, merges them in
/// timestamp order, routes them through per-vendor processors, resolves
/// affected rules via the published event mapping, groups by tenant into
/// `BatchResults`, and submits one multi-tenant batch job. Numbered-step
/// pipeline style: tracing at each stage, early return on empty input.
pub struct EventAssembler {
    store: Arc<dyn Store>,
    license_view: Arc<LicenseView>,
    mapping_provider: Arc<S3EventMappingProvider>,
    executors: Arc<ExecutorRegistry>,
    settings: Settings,
}

impl EventAssembler {
    pub fn new(
        store: Arc<dyn Store>,
        license_view: Arc<LicenseView>,
        mapping_provider: Arc<S3EventMappingProvider>,
        executors: Arc<ExecutorRegistry>,
        settings: Settings,
    ) -> Self {
        Self { store, license_view, mapping_provider, executors, settings }
    }

    pub async fn run(&self) -> Result<AssemblerRun, EventAssemblerError> {
        // 1. Read cursor, range-query every partition.
        let cursor = self.store.get_event_cursor().await?;
        let mut streams = Vec::with_capacity(self.settings.event_partitions as usize);
        for partition in 0..self.settings.event_partitions {
            streams.push(self.store.list_events_since(partition, cursor, PAGE_SIZE).await?);
        }

        // 2. k-way merge by timestamp.
        let merged = k_way_merge(streams);
        if merged.is_empty() {
            debug!(cursor, "no new events since cursor");
            return Err(EventAssemblerError::NoNewEvents);
        }
        info!(count = merged.len(), cursor, "merged events since cursor");

        // 3. Persist the new cursor *before* submission. A submission
        // failure after this point silently loses this window of events —
        // a deliberate trade-off in favor of idempotence on the scanner
        // side, not a bug.
        let new_cursor = merged.last().map(|e| e.timestamp).unwrap_or(cursor);
        self.store.set_event_cursor(new_cursor).await?;

        // 4. Bucket by vendor.
        let (aws_raw, maestro_raw) = bucket_by_vendor(&merged);

        // 5-6. Vendor processors filter + strip + dedup.
        let aws_hits = dedup_stream(aws::process(&aws_raw, self.settings.deployment_account_id.as_deref()));
        let maestro_hits = dedup_stream(maestro::process(&maestro_raw));
        debug!(aws = aws_hits.len(), maestro = maestro_hits.len(), "vendor hits after dedup");

        // 7-11. Resolve tenants, restrict by event-driven license, group
        // into per-tenant region->rule maps, build BatchResults rows.
        let mut batches = Vec::new();
        batches.extend(self.build_aws_batches(aws_hits).await?);
        batches.extend(self.build_maestro_batches(maestro_hits).await?);

        if batches.is_empty() {
            info!("no tenant had any rule survive license restriction; nothing to submit");
            return Ok(AssemblerRun { events_processed: merged.len(), ..Default::default() });
        }

        for batch in &batches {
            self.store.upsert_batch_results(batch).await?;
        }

        // 12. Build the common env, submit one multi-tenant batch job.
        let batch_ids: Vec<String> = batches.iter().map(|b| b.id.to_string()).collect();
        let submitted_at = Utc::now();
        let env = build_event_driven_env(&self.settings, &batch_ids, submitted_at);
        let executor = self.executors.for_mode(self.settings.deployment_mode)?;
        let executor_job_id = executor
            .submit_event_driven(&env)
            .await
            .map_err(|e| EventAssemblerError::Executor(e.to_string()))?;

        for mut batch in batches {
            batch.status = JobStatus::Submitted;
            self.store.upsert_batch_results(&batch).await?;
        }

        Ok(AssemblerRun {
            events_processed: merged.len(),
            batch_results_ids: batches_ids(&batch_ids),
            executor_job_id: Some(executor_job_id),
        })
    }

    async fn build_aws_batches(&self, hits: Vec<AwsHit>) -> Result<Vec<BatchResults>, EventAssemblerError> {
        let mut by_account: HashMap<String, Vec<AwsHit>> = HashMap::new();
        for hit in hits {
            by_account.entry(hit.account_id.clone()).or_default().push(hit);
        }

        let mut batches = Vec::new();
        for (account_id, account_hits) in by_account {
            // 8. Resolve tenant by account id.
            let Some(tenant) = self.store.find_tenant_by_cloud_project(Cloud::Aws, &account_id).await? else {
                warn!(account_id, "no tenant registered for AWS account; dropping events");
                continue;
            };

            // 9. Applicable event-driven license for this tenant/cloud.
            let tenant_customer = tenant.customer.clone();
            let Some(license) = self
                .license_view
                .event_driven_license_for_tenant(&tenant_customer, &tenant.name, Cloud::Aws)
                .await?
            else {
                debug!(tenant = %tenant.name, "no active event-driven license; dropping events");
                continue;
            };

            let license_rules = self.rule_universe(&license.ruleset_ids).await?;
            let mapping = self
                .mapping_provider
                .get(&license.license_key, LATEST_MAPPING_VERSION, Cloud::Aws)
                .await?;

            // 10-11. Restrict to rules-in-event ∩ rules-in-license, group by region.
            let mut region_rules: HashMap<String, HashSet<String>> = HashMap::new();
            for hit in &account_hits {
                let Some(rule_names) =
                    mapping.get(&hit.event_source).and_then(|by_event| by_event.get(&hit.event_name))
                else {
                    continue;
                };
                for rule_name in rule_names {
                    if license_rules.contains(rule_name) {
                        region_rules.entry(hit.region.clone()).or_default().insert(rule_name.clone());
                    }
                }
            }
            if region_rules.is_empty() {
                continue;
            }

            batches.push(self.new_batch(&tenant.name, &tenant_customer.to_string(), tenant.cloud, &account_id, region_rules));
        }
        Ok(batches)
    }

    async fn build_maestro_batches(
        &self,
        hits: Vec<MaestroHit>,
    ) -> Result<Vec<BatchResults>, EventAssemblerError> {
        let mut by_tenant: HashMap<String, Vec<MaestroHit>> = HashMap::new();
        for hit in hits {
            by_tenant.entry(hit.tenant_name.clone()).or_default().push(hit);
        }

        let mut batches = Vec::new();
        for (tenant_name, tenant_hits) in by_tenant {
            // 8. Resolve tenant by name.
            let Some(tenant) = self.store.get_tenant(&TenantName::new(tenant_name.clone())).await? else {
                warn!(tenant_name, "no tenant registered under this name; dropping events");
                continue;
            };
            let cloud = tenant_hits[0].cloud;

            // 9. Applicable event-driven license for this tenant/cloud.
            let tenant_customer = tenant.customer.clone();
            let Some(license) =
                self.license_view.event_driven_license_for_tenant(&tenant_customer, &tenant.name, cloud).await?
            else {
                debug!(tenant = %tenant.name, "no active event-driven license; dropping events");
                continue;
            };

            let license_rules = self.rule_universe(&license.ruleset_ids).await?;
            let mapping = self.mapping_provider.get(&license.license_key, LATEST_MAPPING_VERSION, cloud).await?;

            let mut region_rules: HashMap<String, HashSet<String>> = HashMap::new();
            for hit in &tenant_hits {
                let Some((source, event_name)) = maestro::to_cloudtrail_style(&hit.action) else { continue };
                let Some(rule_names) = mapping.get(source).and_then(|by_event| by_event.get(event_name)) else {
                    continue;
                };
                let region = hit.region.clone().unwrap_or_else(|| rse_domain::GLOBAL_REGION.to_string());
                for rule_name in rule_names {
                    if license_rules.contains(rule_name) {
                        region_rules.entry(region.clone()).or_default().insert(rule_name.clone());
                    }
                }
            }
            if region_rules.is_empty() {
                continue;
            }

            batches.push(self.new_batch(&tenant.name, &tenant_customer.to_string(), cloud, &tenant_name, region_rules));
        }
        Ok(batches)
    }

    async fn rule_universe(&self, ruleset_ids: &HashSet<RulesetId>) -> Result<HashSet<String>, EventAssemblerError> {
        let mut rules = HashSet::new();
        for id in ruleset_ids {
            if let Some(ruleset) = self.store.get_ruleset_by_id(id).await? {
                rules.extend(ruleset.rules);
            }
        }
        Ok(rules)
    }

    fn new_batch(
        &self,
        tenant_name: &TenantName,
        customer: &str,
        cloud: Cloud,
        cloud_identifier: &str,
        region_rules: HashMap<String, HashSet<String>>,
    ) -> BatchResults {
        let now = Utc::now();
        let map: HashMap<String, Vec<String>> = region_rules
            .into_iter()
            .map(|(region, rules)| {
                let mut rules: Vec<String> = rules.into_iter().collect();
                rules.sort();
                (region, rules)
            })
            .collect();
        BatchResults {
            id: BatchResultsId::new(Uuid::new_v4().to_string()),
            tenant_name: tenant_name.clone(),
            customer: customer.to_string(),
            cloud_identifier: cloud_identifier.to_string(),
            cloud,
            rules: compress_region_rule_map(map),
            registration_start: now,
            registration_end: None,
            submitted_at: now,
            status: JobStatus::Pending,
            batch_results_type: EventDrivenBatchType::MultiAccount,
        }
    }
}

fn bucket_by_vendor(events: &[Event]) -> (Vec<serde_json::Value>, Vec<serde_json::Value>) {
    let mut aws = Vec::new();
    let mut maestro = Vec::new();
    for event in events {
        match event.vendor {
            EventVendor::Aws => aws.extend(event.events.iter().cloned()),
            EventVendor::Maestro => maestro.extend(event.events.iter().cloned()),
        }
    }
    (aws, maestro)
}

fn batches_ids(ids: &[String]) -> Vec<BatchResultsId> {
    ids.iter().map(|id| BatchResultsId::new(id.clone())).collect()
}
