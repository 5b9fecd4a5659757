use serde::{Deserialize, Serialize};

/// Raw YAML representation of the control plane's settings file.
#[derive(Debug, Deserialize, Serialize)]
pub struct RawSettings {
    /// `"serverless"` or `"server"`.
    pub deployment_mode: String,
    pub buckets: RawBuckets,
    pub aws_region: String,
    #[serde(default = "default_event_partitions")]
    pub event_partitions: u32,
    #[serde(default)]
    pub job_ttl_minutes: Option<u32>,
    #[serde(default = "default_job_lifetime_minutes")]
    pub batch_job_lifetime_minutes: u32,
    #[serde(default = "default_log_level")]
    pub batch_job_log_level: String,
    #[serde(default = "default_system_customer")]
    pub system_customer_name: String,
    #[serde(default = "default_aws_shard_count")]
    pub aws_shard_count: u32,
    #[serde(default = "default_core_version")]
    pub min_core_version: String,
    #[serde(default = "default_core_version")]
    pub current_core_version: String,
    /// Our own AWS account id, used by the event assembler to drop
    /// self-generated CloudTrail events.
    #[serde(default)]
    pub deployment_account_id: Option<String>,
}

fn default_core_version() -> String {
    "0.0.0".to_string()
}

fn default_event_partitions() -> u32 {
    10
}

fn default_job_lifetime_minutes() -> u32 {
    180
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_system_customer() -> String {
    "SYSTEM".to_string()
}

fn default_aws_shard_count() -> u32 {
    2
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RawBuckets {
    pub rulesets: String,
    pub reports: String,
    pub recommendations: String,
}
