use axum::extract::{Path, State};
use axum::Json;
use rse_admission::{CredentialsPayload, RulesetNameInput, SubmitJobRequest};
use rse_domain::{CustomerName, JobId, TenantName};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

/// The exact set of recognized options for a job admission request —
/// `deny_unknown_fields` rejects anything else at the boundary rather than
/// silently ignoring it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubmitJobBody {
    pub tenant_name: String,
    pub customer: String,
    #[serde(default)]
    pub target_regions: Vec<String>,
    #[serde(default)]
    pub credentials: Option<CredentialsBody>,
    #[serde(default)]
    pub license_key: Option<String>,
    #[serde(default)]
    pub rulesets: Vec<RulesetNameBody>,
    #[serde(default)]
    pub rules_to_scan: Vec<String>,
    #[serde(default)]
    pub platform_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsBody {
    pub ciphertext: String,
    #[serde(default)]
    pub resolved_cloud_identifier: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesetNameBody {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

pub async fn submit_job(
    State(state): State<AppState>,
    Json(body): Json<SubmitJobBody>,
) -> Result<Json<rse_domain::Job>, ApiError> {
    let request = SubmitJobRequest {
        tenant: TenantName::new(body.tenant_name),
        accessible_tenants: None,
        regions: body.target_regions,
        license_key: body.license_key.map(rse_domain::LicenseKey::new),
        rulesets: body
            .rulesets
            .into_iter()
            .map(|r| RulesetNameInput { name: r.name, version: r.version })
            .collect(),
        rules_to_scan: body.rules_to_scan,
        credentials: body.credentials.map(|c| CredentialsPayload {
            ciphertext: c.ciphertext,
            resolved_cloud_identifier: c.resolved_cloud_identifier,
        }),
        platform_id: body.platform_id,
        scheduled_job_name: None,
    };
    let job = state.admission.submit_job(&CustomerName::new(body.customer), request).await?;
    Ok(Json(job))
}

pub async fn terminate_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<rse_domain::Job>, ApiError> {
    let job = state.admission.terminate_job(&JobId::new(id)).await?;
    Ok(Json(job))
}
