use serde::{Deserialize, Serialize};

use crate::ids::TenantName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScheduledJobType {
    Standard,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJobMeta {
    pub rulesets: Vec<String>,
    pub regions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub name: String,
    pub customer: String,
    pub tenant: TenantName,
    #[serde(rename = "type")]
    pub job_type: ScheduledJobType,
    /// cron expression, e.g. `"0 */6 * * *"`.
    pub schedule: String,
    pub meta: ScheduledJobMeta,
    pub enabled: bool,
    #[serde(default)]
    pub description: Option<String>,
}
