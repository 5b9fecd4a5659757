use std::collections::{HashMap, HashSet};

use rse_domain::job::RulesetName;
use rse_domain::{CustomerName, License, LicenseKey, Ruleset, RulesetVersion, Tenant, TenantLicenseKey};
use rse_licensing::LicenseView;
use rse_rulesets::fuzzy_match;
use rse_store::Store;

use crate::error::AdmissionError;

/// A caller-supplied ruleset reference, before resolution — may be left
/// unqualified (no version).
#[derive(Debug, Clone)]
pub struct RulesetNameInput {
    pub name: String,
    pub version: Option<String>,
}

pub struct ResolvedRulesets {
    /// Ordered, fully-qualified `name[:version[:licenseKey]]` references for
    /// serialization into the executor env.
    pub names: Vec<RulesetName>,
    pub rulesets: Vec<Ruleset>,
    pub affected_license: Option<LicenseKey>,
    pub affected_tenant_license_key: Option<TenantLicenseKey>,
}

/// Ruleset resolution: intersects the tenant's licenses with requested
/// ruleset names across cases A (license-only), B (name-only / local), and
/// C (both).
pub async fn resolve_rulesets(
    store: &dyn Store,
    license_view: &LicenseView,
    customer: &CustomerName,
    tenant: &Tenant,
    license_key: Option<&LicenseKey>,
    names: &[RulesetNameInput],
) -> Result<ResolvedRulesets, AdmissionError> {
    let candidate_licenses: Vec<License> = match license_key {
        Some(key) => vec![license_view.resolve_applicable(customer, &tenant.name, key).await?],
        None => license_view.active_licenses_for_tenant(customer, &tenant.name).await?,
    };

    if names.is_empty() && candidate_licenses.is_empty() {
        return Err(AdmissionError::NoRulesetsOrLicenses);
    }

    if names.is_empty() {
        case_a(store, tenant, &candidate_licenses).await
    } else if candidate_licenses.is_empty() {
        case_b(store, customer, tenant, names).await
    } else {
        case_c(store, customer, tenant, names, &candidate_licenses).await
    }
}

/// Case A: no ruleset names, some licenses. Every ruleset id each license
/// carries whose cloud matches the tenant contributes; more than one
/// license contributing is ambiguous.
async fn case_a(
    store: &dyn Store,
    tenant: &Tenant,
    licenses: &[License],
) -> Result<ResolvedRulesets, AdmissionError> {
    let mut contributing: HashMap<LicenseKey, (TenantLicenseKey, Vec<Ruleset>)> = HashMap::new();
    for license in licenses {
        let Some(tlk) = license.tenant_license_key(&tenant.customer) else { continue };
        for ruleset_id in &license.ruleset_ids {
            let Some(ruleset) = store.get_ruleset_by_id(ruleset_id).await? else { continue };
            if ruleset.cloud != tenant.cloud {
                continue;
            }
            contributing
                .entry(license.license_key.clone())
                .or_insert_with(|| (tlk.clone(), Vec::new()))
                .1
                .push(ruleset);
        }
    }

    if contributing.len() > 1 {
        return Err(AdmissionError::AmbiguousLicense(ambiguous_keys(contributing.keys())));
    }

    let Some((license_key, (tlk, rulesets))) = contributing.into_iter().next() else {
        return Err(AdmissionError::NoRulesetsOrLicenses);
    };

    let names = rulesets
        .iter()
        .map(|r| RulesetName {
            name: r.name.clone(),
            version: Some(r.version.to_string()),
            license_key: Some(license_key.clone()),
        })
        .collect();

    Ok(ResolvedRulesets {
        names,
        rulesets,
        affected_license: Some(license_key),
        affected_tenant_license_key: Some(tlk),
    })
}

/// Case B: ruleset names only (no license in play). Each name is looked up
/// as a local ruleset — specific version if given, else latest — under the
/// tenant's customer.
async fn case_b(
    store: &dyn Store,
    customer: &CustomerName,
    tenant: &Tenant,
    names: &[RulesetNameInput],
) -> Result<ResolvedRulesets, AdmissionError> {
    let mut resolved_names = Vec::with_capacity(names.len());
    let mut rulesets = Vec::with_capacity(names.len());

    for input in names {
        let ruleset = resolve_local(store, customer, &input.name, input.version.as_deref()).await?;
        if ruleset.cloud != tenant.cloud {
            return Err(AdmissionError::RulesetNotFound(input.name.clone()));
        }
        resolved_names.push(RulesetName {
            name: ruleset.name.clone(),
            version: Some(ruleset.version.to_string()),
            license_key: None,
        });
        rulesets.push(ruleset);
    }

    Ok(ResolvedRulesets { names: resolved_names, rulesets, affected_license: None, affected_tenant_license_key: None })
}

/// Case C: both names and licenses present. Each name tries every
/// candidate license first (matching on ruleset id membership, cloud, and
/// — if a version was requested — that version's existence); names no
/// license matches fall through to Case B's local-resolution rules.
async fn case_c(
    store: &dyn Store,
    customer: &CustomerName,
    tenant: &Tenant,
    names: &[RulesetNameInput],
    licenses: &[License],
) -> Result<ResolvedRulesets, AdmissionError> {
    let mut resolved_names = Vec::new();
    let mut rulesets = Vec::new();
    let mut matched_licenses: HashMap<LicenseKey, TenantLicenseKey> = HashMap::new();
    let mut unmatched = Vec::new();

    'name: for input in names {
        for license in licenses {
            let Some(tlk) = license.tenant_license_key(&tenant.customer) else { continue };
            for ruleset_id in &license.ruleset_ids {
                let Some(ruleset) = store.get_ruleset_by_id(ruleset_id).await? else { continue };
                if ruleset.name != input.name || ruleset.cloud != tenant.cloud {
                    continue;
                }
                if let Some(v) = &input.version {
                    let version = RulesetVersion::parse(v)
                        .ok_or_else(|| AdmissionError::RulesetNotFound(format!("{}:{v}", input.name)))?;
                    if store.get_ruleset(customer, &ruleset.name, &version).await?.is_none() {
                        continue;
                    }
                }
                matched_licenses.insert(license.license_key.clone(), tlk.clone());
                resolved_names.push(RulesetName {
                    name: ruleset.name.clone(),
                    version: Some(ruleset.version.to_string()),
                    license_key: Some(license.license_key.clone()),
                });
                rulesets.push(ruleset);
                continue 'name;
            }
        }
        unmatched.push(input.clone());
    }

    if matched_licenses.len() > 1 {
        return Err(AdmissionError::AmbiguousLicense(ambiguous_keys(matched_licenses.keys())));
    }

    if !unmatched.is_empty() {
        let fallback = case_b(store, customer, tenant, &unmatched).await?;
        resolved_names.extend(fallback.names);
        rulesets.extend(fallback.rulesets);
    }

    let mut affected = matched_licenses.into_iter();
    let (affected_license, affected_tenant_license_key) = match affected.next() {
        Some((key, tlk)) => (Some(key), Some(tlk)),
        None => (None, None),
    };

    Ok(ResolvedRulesets { names: resolved_names, rulesets, affected_license, affected_tenant_license_key })
}

async fn resolve_local(
    store: &dyn Store,
    customer: &CustomerName,
    name: &str,
    version: Option<&str>,
) -> Result<Ruleset, AdmissionError> {
    let ruleset = match version {
        Some(v) => {
            let version = RulesetVersion::parse(v)
                .ok_or_else(|| AdmissionError::RulesetNotFound(format!("{name}:{v}")))?;
            store.get_ruleset(customer, name, &version).await?
        }
        None => store.get_latest_ruleset(customer, name).await?,
    };
    ruleset.ok_or_else(|| AdmissionError::RulesetNotFound(name.to_string()))
}

fn ambiguous_keys<'a>(keys: impl Iterator<Item = &'a LicenseKey>) -> String {
    let mut keys: Vec<String> = keys.map(|k| k.to_string()).collect();
    keys.sort();
    keys.join(", ")
}

/// If `requested` is non-empty, intersect it with the union of rule names
/// across `rulesets` via the fuzzy resolver; anything left unresolved is a
/// `BAD_REQUEST`.
pub fn resolve_rules_to_scan(
    rulesets: &[Ruleset],
    requested: &[String],
) -> Result<Vec<String>, AdmissionError> {
    if requested.is_empty() {
        return Ok(Vec::new());
    }
    let universe: Vec<String> = rulesets.iter().flat_map(|r| r.rules.iter().cloned()).collect();
    let resolution = fuzzy_match(&universe, requested, false, false);
    if !resolution.unresolved.is_empty() {
        return Err(AdmissionError::UnresolvedRulesToScan(resolution.unresolved));
    }
    let mut result: HashSet<String> = HashSet::new();
    for matched in resolution.resolved.into_values() {
        result.extend(matched);
    }
    let mut result: Vec<String> = result.into_iter().collect();
    result.sort();
    Ok(result)
}
