use serde::{Deserialize, Serialize};

use crate::ids::{JobId, LicenseKey, TenantName};
use crate::tenant::Cloud;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Submitted,
    Pending,
    Runnable,
    Starting,
    Running,
    Failed,
    Succeeded,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// A resolved ruleset reference, serialized into the executor env as
/// `name[:version[:licenseKey]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesetName {
    pub name: String,
    pub version: Option<String>,
    pub license_key: Option<LicenseKey>,
}

impl std::fmt::Display for RulesetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(v) = &self.version {
            write!(f, ":{v}")?;
        }
        if let Some(lk) = &self.license_key {
            write!(f, ":{lk}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub tenant_name: TenantName,
    pub customer: String,
    pub cloud: Cloud,
    pub regions: Vec<String>,
    pub rulesets: Vec<RulesetName>,
    pub rules_to_scan: Option<Vec<String>>,
    pub status: JobStatus,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub batch_job_id: Option<String>,
    pub credentials_key: Option<String>,
    pub affected_license: Option<LicenseKey>,
    pub platform_id: Option<String>,
    pub ttl: Option<chrono::DateTime<chrono::Utc>>,
    pub reason: Option<String>,
    /// Set when this Job was created by a [`crate::ScheduledJob`] firing
    /// rather than direct admission.
    pub scheduled_job_name: Option<String>,
}

impl Job {
    pub fn terminate(&mut self, reason: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.reason = Some(reason.into());
    }
}
