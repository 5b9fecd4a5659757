use axum::extract::{Path, State};
use axum::Json;
use rse_admission::RulesetNameInput;
use rse_domain::TenantName;
use rse_scheduled_jobs::{RegisterScheduledJobRequest, UpdateScheduledJobRequest};
use serde::Deserialize;

use super::rulesets::RulesetNameBody as SharedRulesetNameBody;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterScheduledJobBody {
    pub customer: String,
    pub tenant: String,
    pub name: String,
    pub schedule: String,
    #[serde(default)]
    pub rulesets: Vec<SharedRulesetNameBody>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

pub async fn register_scheduled_job(
    State(state): State<AppState>,
    Json(body): Json<RegisterScheduledJobBody>,
) -> Result<Json<rse_domain::ScheduledJob>, ApiError> {
    let job = state
        .scheduled_jobs
        .register(RegisterScheduledJobRequest {
            customer: body.customer,
            tenant: TenantName::new(body.tenant),
            name: body.name,
            schedule: body.schedule,
            rulesets: body
                .rulesets
                .into_iter()
                .map(|r| RulesetNameInput { name: r.name, version: r.version })
                .collect(),
            regions: body.regions,
            description: body.description,
            enabled: body.enabled,
        })
        .await?;
    Ok(Json(job))
}

pub async fn list_scheduled_jobs(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> Result<Json<Vec<rse_domain::ScheduledJob>>, ApiError> {
    let jobs = state.scheduled_jobs.list_for_tenant(&TenantName::new(tenant)).await?;
    Ok(Json(jobs))
}

pub async fn get_scheduled_job(
    State(state): State<AppState>,
    Path((customer, name)): Path<(String, String)>,
) -> Result<Json<rse_domain::ScheduledJob>, ApiError> {
    let job = state.scheduled_jobs.get(&customer, &name).await?;
    Ok(Json(job))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateScheduledJobBody {
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

pub async fn update_scheduled_job(
    State(state): State<AppState>,
    Path((customer, name)): Path<(String, String)>,
    Json(body): Json<UpdateScheduledJobBody>,
) -> Result<Json<rse_domain::ScheduledJob>, ApiError> {
    let job = state
        .scheduled_jobs
        .update(
            &customer,
            &name,
            UpdateScheduledJobRequest {
                schedule: body.schedule,
                description: body.description,
                enabled: body.enabled,
            },
        )
        .await?;
    Ok(Json(job))
}

pub async fn delete_scheduled_job(
    State(state): State<AppState>,
    Path((customer, name)): Path<(String, String)>,
) -> Result<axum::http::StatusCode, ApiError> {
    state.scheduled_jobs.delete(&customer, &name).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
