use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::{BatchResultsId, TenantName};
use crate::job::JobStatus;
use crate::tenant::Cloud;

/// Always `MULTI_ACCOUNT` today; kept as an enum of one variant so future
/// event-driven batch shapes don't require a field rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventDrivenBatchType {
    MultiAccount,
}

/// `rules` is a region → rule-names map before compression, or a
/// CSV-joined-region-tuple → rule-names map after the compression step that
/// groups rules sharing an identical region set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegionRuleMap {
    PerRegion(HashMap<String, Vec<String>>),
    Compressed(HashMap<String, Vec<String>>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    pub id: BatchResultsId,
    pub tenant_name: TenantName,
    pub customer: String,
    pub cloud_identifier: String,
    pub cloud: Cloud,
    pub rules: RegionRuleMap,
    pub registration_start: chrono::DateTime<chrono::Utc>,
    pub registration_end: Option<chrono::DateTime<chrono::Utc>>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub status: JobStatus,
    pub batch_results_type: EventDrivenBatchType,
}
