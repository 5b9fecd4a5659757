use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use rse_config::blob_paths;
use rse_domain::{Cloud, CustomerName, Rule, Ruleset, RulesetId, RulesetVersion, S3Path, SYSTEM_CUSTOMER};
use rse_store::Store;

use crate::bundle_io::RulesetBundleIo;
use crate::content_hash::compute_bundle_hash;
use crate::error::RulesetError;
use crate::rule_name::fuzzy_match;

#[derive(Debug, Clone)]
pub struct CreateRulesetRequest {
    pub customer: Option<String>,
    pub name: String,
    pub cloud: Cloud,
    pub description: Option<String>,
    pub display_name: Option<String>,
    pub version: Option<String>,
    pub rule_source_id: Option<String>,
    pub git_project: Option<String>,
    pub git_ref: Option<String>,
    pub rules: Option<Vec<String>>,
    pub excluded_rules: Vec<String>,
    pub platforms: Vec<String>,
    pub categories: Vec<String>,
    pub service_sections: Vec<String>,
    pub sources: Vec<String>,
    pub licensed: bool,
    pub event_driven: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateRulesetRequest {
    pub version: Option<String>,
    pub description: Option<String>,
    pub display_name: Option<String>,
    pub rules_to_detach: Vec<String>,
    pub rules_to_attach: Vec<String>,
    pub force: bool,
}

pub struct ReleaseResult {
    pub ruleset_id: RulesetId,
    pub released: bool,
    pub message: Option<String>,
}

pub struct ReleaseOutcome {
    pub results: Vec<ReleaseResult>,
}

impl ReleaseOutcome {
    /// `201` iff every ruleset released, else the aggregate multi-status.
    pub fn all_released(&self) -> bool {
        self.results.iter().all(|r| r.released)
    }
}

/// Ruleset create/update/release pipelines, built on the `Store` for
/// metadata and `RulesetBundleIo` for the gzip-over-S3 policy bundle.
pub struct RulesetService {
    store: Arc<dyn Store>,
    bundle_io: RulesetBundleIo,
    bucket: String,
    lm_base_url: String,
    http: reqwest::Client,
}

impl RulesetService {
    pub fn new(
        store: Arc<dyn Store>,
        bundle_io: RulesetBundleIo,
        bucket: impl Into<String>,
        lm_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bundle_io,
            bucket: bucket.into(),
            lm_base_url: lm_base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn create(&self, request: CreateRulesetRequest) -> Result<Ruleset, RulesetError> {
        let customer = CustomerName::new(request.customer.clone().unwrap_or_else(|| SYSTEM_CUSTOMER.to_string()));

        let version = self.resolve_desired_version(&customer, &request).await?;

        if let Some(existing) = self.store.get_latest_ruleset(&customer, &request.name).await? {
            if existing.cloud != request.cloud {
                return Err(RulesetError::CloudMismatch(request.name.clone(), existing.cloud.to_string()));
            }
        }

        let candidates = self.collect_candidate_rules(&customer, &request).await?;
        let deduped = dedup_latest_per_name(candidates);
        let selected = apply_exclusion_and_mapping_filters(deduped, &request);

        if selected.is_empty() {
            return Err(RulesetError::EmptySelection);
        }

        let policies: BTreeMap<String, serde_json::Value> =
            selected.iter().map(|r| (r.name.clone(), r.build_policy())).collect();
        let bundle = serde_json::json!({ "policies": policies.values().collect::<Vec<_>>() });

        let key = blob_paths::standard_ruleset_key(customer.as_str(), &request.name, &version.to_string());
        self.bundle_io.write_bundle(&key, &bundle).await?;

        let ruleset = Ruleset {
            id: RulesetId::new(uuid::Uuid::new_v4().to_string()),
            customer,
            name: request.name,
            version,
            cloud: request.cloud,
            description: request.description,
            display_name: request.display_name,
            rules: selected.into_iter().map(|r| r.name).collect(),
            licensed: request.licensed,
            event_driven: request.event_driven,
            s3_path: S3Path { bucket: self.bucket.clone(), key },
            license_keys: Default::default(),
            created_at: Utc::now(),
        };
        self.store.upsert_ruleset(&ruleset).await?;
        tracing::info!(ruleset_id = %ruleset.id, name = %ruleset.name, "ruleset created");
        Ok(ruleset)
    }

    async fn resolve_desired_version(
        &self,
        customer: &CustomerName,
        request: &CreateRulesetRequest,
    ) -> Result<RulesetVersion, RulesetError> {
        if let Some(explicit) = &request.version {
            let version = RulesetVersion::parse(explicit)
                .ok_or_else(|| RulesetError::UnresolvableVersion(request.name.clone()))?;
            if self.store.get_ruleset(customer, &request.name, &version).await?.is_some() {
                return Err(RulesetError::VersionConflict(format!("{}:{}", request.name, version)));
            }
            return Ok(version);
        }

        if let Some(source_id) = &request.rule_source_id {
            let source = self
                .store
                .get_rule_source(&rse_domain::RuleSourceId::new(source_id.clone()))
                .await?
                .ok_or_else(|| RulesetError::UnresolvableVersion(request.name.clone()))?;
            let tag = source
                .resolvable_release_version()
                .ok_or_else(|| RulesetError::UnresolvableVersion(request.name.clone()))?;
            let version = RulesetVersion::parse(tag)
                .ok_or_else(|| RulesetError::UnresolvableVersion(request.name.clone()))?;
            if self.store.get_ruleset(customer, &request.name, &version).await?.is_some() {
                return Err(RulesetError::VersionConflict(format!("{}:{}", request.name, version)));
            }
            return Ok(version);
        }

        Err(RulesetError::UnresolvableVersion(request.name.clone()))
    }

    async fn collect_candidate_rules(
        &self,
        customer: &CustomerName,
        request: &CreateRulesetRequest,
    ) -> Result<Vec<Rule>, RulesetError> {
        if let Some(names) = &request.rules {
            let mut rules = Vec::with_capacity(names.len());
            for name in names {
                if let Some(rule) = self.store.get_rule(customer, name).await? {
                    rules.push(rule);
                }
            }
            return Ok(rules);
        }

        let all = self.store.list_rules_for_customer_cloud(customer, request.cloud).await?;

        if request.rule_source_id.is_some() {
            // Rule-source-scoped selection falls back to the full
            // (customer, cloud) set: the current Rule shape doesn't retain
            // a source-id back-reference, so a source can't be used to
            // narrow the candidate list beyond the next priority tier.
            return Ok(all);
        }

        if let (Some(project), Some(git_ref)) = (&request.git_project, &request.git_ref) {
            return Ok(all
                .into_iter()
                .filter(|r| &r.location.project == project && &r.location.git_ref == git_ref)
                .collect());
        }

        Ok(all)
    }

    pub async fn update(
        &self,
        customer: &str,
        name: &str,
        request: UpdateRulesetRequest,
    ) -> Result<Ruleset, RulesetError> {
        let customer = CustomerName::new(customer.to_string());
        let existing = self.resolve_target(&customer, name, request.version.as_deref()).await?;

        let current_bundle = self
            .bundle_io
            .read_bundle(&existing.s3_path.key)
            .await?
            .ok_or_else(|| RulesetError::NotFound(existing.s3_path.key.clone()))?;
        let mut policies = bundle_to_map(&current_bundle);
        let old_hash = compute_bundle_hash(&policies);

        if !request.rules_to_detach.is_empty() {
            let names: Vec<String> = policies.keys().cloned().collect();
            let resolution = fuzzy_match(&names, &request.rules_to_detach, true, false);
            if !resolution.unresolved.is_empty() {
                return Err(RulesetError::UnresolvedFragments(resolution.unresolved));
            }
            for matched in resolution.resolved.into_values().flatten() {
                policies.remove(&matched);
            }
        }

        for name in &request.rules_to_attach {
            let rule = self
                .store
                .get_rule(&customer, name)
                .await?
                .ok_or_else(|| RulesetError::NotFound(name.clone()))?;
            policies.insert(rule.name.clone(), rule.build_policy());
        }

        // Refresh remaining rules against their current latest Rule version.
        let remaining_names: Vec<String> = policies.keys().cloned().collect();
        for name in remaining_names {
            if let Some(rule) = self.store.get_rule(&customer, &name).await? {
                policies.insert(name, rule.build_policy());
            }
        }

        let new_hash = compute_bundle_hash(&policies);
        if new_hash == old_hash && !request.force {
            return Err(RulesetError::NoOpUpdate);
        }

        let new_version = existing.version.bump_minor();
        let bundle = serde_json::json!({ "policies": policies.values().collect::<Vec<_>>() });
        let key = blob_paths::standard_ruleset_key(customer.as_str(), &existing.name, &new_version.to_string());
        self.bundle_io.write_bundle(&key, &bundle).await?;

        let updated = Ruleset {
            id: RulesetId::new(uuid::Uuid::new_v4().to_string()),
            customer,
            name: existing.name,
            version: new_version,
            cloud: existing.cloud,
            description: request.description.or(existing.description),
            display_name: request.display_name.or(existing.display_name),
            rules: policies.keys().cloned().collect(),
            licensed: existing.licensed,
            event_driven: existing.event_driven,
            s3_path: S3Path { bucket: self.bucket.clone(), key },
            license_keys: existing.license_keys,
            created_at: Utc::now(),
        };
        self.store.upsert_ruleset(&updated).await?;
        tracing::info!(ruleset_id = %updated.id, version = %updated.version, "ruleset updated");
        Ok(updated)
    }

    async fn resolve_target(
        &self,
        customer: &CustomerName,
        name: &str,
        version: Option<&str>,
    ) -> Result<Ruleset, RulesetError> {
        match version {
            Some(v) => {
                let version = RulesetVersion::parse(v)
                    .ok_or_else(|| RulesetError::UnresolvableVersion(name.to_string()))?;
                self.store
                    .get_ruleset(customer, name, &version)
                    .await?
                    .ok_or_else(|| RulesetError::NotFound(format!("{name}:{v}")))
            }
            None => self
                .store
                .get_latest_ruleset(customer, name)
                .await?
                .ok_or_else(|| RulesetError::NotFound(name.to_string())),
        }
    }

    pub async fn release(&self, ruleset_ids: &[RulesetId]) -> Result<ReleaseOutcome, RulesetError> {
        let mut results = Vec::with_capacity(ruleset_ids.len());
        for id in ruleset_ids {
            let outcome = self.release_one(id).await;
            results.push(match outcome {
                Ok(()) => ReleaseResult { ruleset_id: id.clone(), released: true, message: None },
                Err(err) => ReleaseResult { ruleset_id: id.clone(), released: false, message: Some(err.to_string()) },
            });
        }
        Ok(ReleaseOutcome { results })
    }

    async fn release_one(&self, id: &RulesetId) -> Result<(), RulesetError> {
        let ruleset =
            self.store.get_ruleset_by_id(id).await?.ok_or_else(|| RulesetError::NotFound(id.to_string()))?;
        let download_url = self
            .bundle_io
            .presigned_download_url(&ruleset.s3_path.key, std::time::Duration::from_secs(3600))
            .await?;

        let payload = serde_json::json!({
            "name": ruleset.name,
            "version": ruleset.version.to_string(),
            "cloud": ruleset.cloud.to_string(),
            "description": ruleset.description,
            "displayName": ruleset.display_name,
            "downloadUrl": download_url,
            "rules": ruleset.rules,
        });

        let response = self
            .http
            .post(format!("{}/rulesets", self.lm_base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| RulesetError::LicenseManager(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RulesetError::LicenseManager(format!("license manager returned {}", response.status())));
        }
        Ok(())
    }
}

fn dedup_latest_per_name(rules: Vec<Rule>) -> Vec<Rule> {
    let mut by_name: std::collections::HashMap<String, Rule> = std::collections::HashMap::new();
    for rule in rules {
        match by_name.get(&rule.name) {
            Some(existing) if existing.updated_date >= rule.updated_date => {}
            _ => {
                by_name.insert(rule.name.clone(), rule);
            }
        }
    }
    by_name.into_values().collect()
}

fn apply_exclusion_and_mapping_filters(rules: Vec<Rule>, request: &CreateRulesetRequest) -> Vec<Rule> {
    let mut rules = rules;
    if !request.excluded_rules.is_empty() {
        let names: Vec<String> = rules.iter().map(|r| r.name.clone()).collect();
        let resolution = fuzzy_match(&names, &request.excluded_rules, true, false);
        let excluded: std::collections::HashSet<String> =
            resolution.resolved.into_values().flatten().collect();
        rules.retain(|r| !excluded.contains(&r.name));
    }

    rules
        .into_iter()
        .filter(|r| {
            facet_matches(&request.platforms, &r.comment_meta.platforms)
                && facet_matches(&request.categories, &r.comment_meta.categories)
                && facet_matches(&request.service_sections, &r.comment_meta.service_sections)
                && facet_matches(&request.sources, &r.comment_meta.sources)
        })
        .collect()
}

fn facet_matches(requested: &[String], rule_facet: &[String]) -> bool {
    requested.is_empty() || requested.iter().any(|f| rule_facet.contains(f))
}

fn bundle_to_map(bundle: &serde_json::Value) -> BTreeMap<String, serde_json::Value> {
    bundle
        .get("policies")
        .and_then(|p| p.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|p| p.get("name").and_then(|n| n.as_str()).map(|n| (n.to_string(), p.clone())))
                .collect()
        })
        .unwrap_or_default()
}
