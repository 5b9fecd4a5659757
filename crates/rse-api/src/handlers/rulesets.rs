use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rse_domain::{Cloud, RulesetId};
use rse_rulesets::{CreateRulesetRequest as ServiceCreateRequest, UpdateRulesetRequest as ServiceUpdateRequest};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// The recognized request body for creating a ruleset; unknown fields are
/// rejected at the boundary rather than silently ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateRulesetBody {
    #[serde(default)]
    pub customer: Option<String>,
    pub name: String,
    pub cloud: Cloud,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub rule_source_id: Option<String>,
    #[serde(default)]
    pub git_project_id: Option<String>,
    #[serde(default)]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub rules: Option<Vec<String>>,
    #[serde(default)]
    pub excluded_rules: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub service_sections: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub licensed: bool,
    #[serde(default)]
    pub event_driven: bool,
}

pub async fn create_ruleset(
    State(state): State<AppState>,
    Json(body): Json<CreateRulesetBody>,
) -> Result<(StatusCode, Json<rse_domain::Ruleset>), ApiError> {
    let ruleset = state
        .rulesets
        .create(ServiceCreateRequest {
            customer: body.customer,
            name: body.name,
            cloud: body.cloud,
            description: body.description,
            display_name: body.display_name,
            version: body.version,
            rule_source_id: body.rule_source_id,
            git_project: body.git_project_id,
            git_ref: body.git_ref,
            rules: body.rules,
            excluded_rules: body.excluded_rules,
            platforms: body.platforms,
            categories: body.categories,
            service_sections: body.service_sections,
            sources: body.sources,
            licensed: body.licensed,
            event_driven: body.event_driven,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ruleset)))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateRulesetBody {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub rules_to_detach: Vec<String>,
    #[serde(default)]
    pub rules_to_attach: Vec<String>,
    #[serde(default)]
    pub force: bool,
}

pub async fn update_ruleset(
    State(state): State<AppState>,
    Path((customer, name)): Path<(String, String)>,
    Json(body): Json<UpdateRulesetBody>,
) -> Result<Json<rse_domain::Ruleset>, ApiError> {
    let ruleset = state
        .rulesets
        .update(
            &customer,
            &name,
            ServiceUpdateRequest {
                version: body.version,
                description: body.description,
                display_name: body.display_name,
                rules_to_detach: body.rules_to_detach,
                rules_to_attach: body.rules_to_attach,
                force: body.force,
            },
        )
        .await?;
    Ok(Json(ruleset))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReleaseRulesetsBody {
    pub ruleset_ids: Vec<String>,
}

/// `201` iff every ruleset released, else `207` for a partial release.
pub async fn release_rulesets(
    State(state): State<AppState>,
    Json(body): Json<ReleaseRulesetsBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let ids: Vec<RulesetId> = body.ruleset_ids.into_iter().map(RulesetId::new).collect();
    let outcome = state.rulesets.release(&ids).await?;
    let status = if outcome.all_released() { StatusCode::CREATED } else { StatusCode::from_u16(207).unwrap() };
    let body = json!({
        "results": outcome.results.iter().map(|r| json!({
            "rulesetId": r.ruleset_id.to_string(),
            "released": r.released,
            "message": r.message,
        })).collect::<Vec<_>>(),
    });
    Ok((status, Json(body)))
}
