use std::path::Path;

use tracing::debug;

use crate::error::ConfigError;
use crate::raw::RawSettings;

/// Scheduling model the control plane runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeploymentMode {
    /// (a) short-lived serverless request handlers.
    Serverless,
    /// (b) long-running server with a fixed-size worker pool and a
    /// cron-equivalent scheduler for background tasks.
    Server,
}

#[derive(Debug, Clone)]
pub struct BucketNames {
    pub rulesets: String,
    pub reports: String,
    pub recommendations: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub deployment_mode: DeploymentMode,
    pub buckets: BucketNames,
    pub aws_region: String,
    pub event_partitions: u32,
    pub job_ttl_minutes: Option<u32>,
    pub batch_job_lifetime_minutes: u32,
    pub batch_job_log_level: String,
    pub system_customer_name: String,
    pub aws_shard_count: u32,
    /// Compatibility gate against the rule engine core shipped in the
    /// executor image: `min_core_version` is the floor ruleset releases
    /// must remain compatible with, `current_core_version` is the one
    /// actually deployed.
    pub min_core_version: String,
    pub current_core_version: String,
    pub deployment_account_id: Option<String>,
}

/// Load settings from a YAML file at `path`.
///
/// Enumerated fields (`deployment_mode`) are never silently defaulted —
/// an unrecognized value is a hard `ConfigError::Invalid`, matching the
/// teacher's `parse_cloud`/`parse_export_type` style of explicit
/// match-with-Err conversion.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let raw: RawSettings = serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
        path: path.display().to_string(),
        source: e,
    })?;
    debug!(path = %path.display(), "loaded settings");
    convert_settings(raw)
}

fn convert_settings(raw: RawSettings) -> Result<Settings, ConfigError> {
    let deployment_mode = parse_deployment_mode(&raw.deployment_mode)?;
    if raw.event_partitions == 0 {
        return Err(ConfigError::Invalid("event_partitions must be >= 1".into()));
    }
    if raw.aws_shard_count == 0 {
        return Err(ConfigError::Invalid("aws_shard_count must be >= 1".into()));
    }
    Ok(Settings {
        deployment_mode,
        buckets: BucketNames {
            rulesets: raw.buckets.rulesets,
            reports: raw.buckets.reports,
            recommendations: raw.buckets.recommendations,
        },
        aws_region: raw.aws_region,
        event_partitions: raw.event_partitions,
        job_ttl_minutes: raw.job_ttl_minutes,
        batch_job_lifetime_minutes: raw.batch_job_lifetime_minutes,
        batch_job_log_level: raw.batch_job_log_level,
        system_customer_name: raw.system_customer_name,
        aws_shard_count: raw.aws_shard_count,
        min_core_version: raw.min_core_version,
        current_core_version: raw.current_core_version,
        deployment_account_id: raw.deployment_account_id,
    })
}

fn parse_deployment_mode(s: &str) -> Result<DeploymentMode, ConfigError> {
    match s {
        "serverless" => Ok(DeploymentMode::Serverless),
        "server" => Ok(DeploymentMode::Server),
        other => Err(ConfigError::Invalid(format!("unknown deployment_mode '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_deployment_mode() {
        let raw = RawSettings {
            deployment_mode: "bogus".into(),
            buckets: crate::raw::RawBuckets {
                rulesets: "r".into(),
                reports: "rep".into(),
                recommendations: "rec".into(),
            },
            aws_region: "us-east-1".into(),
            event_partitions: 10,
            job_ttl_minutes: None,
            batch_job_lifetime_minutes: 180,
            batch_job_log_level: "INFO".into(),
            system_customer_name: "SYSTEM".into(),
            aws_shard_count: 2,
            min_core_version: "1.0.0".into(),
            current_core_version: "1.2.0".into(),
            deployment_account_id: None,
        };
        assert!(matches!(convert_settings(raw), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn parses_server_mode() {
        let raw = RawSettings {
            deployment_mode: "server".into(),
            buckets: crate::raw::RawBuckets {
                rulesets: "r".into(),
                reports: "rep".into(),
                recommendations: "rec".into(),
            },
            aws_region: "us-east-1".into(),
            event_partitions: 10,
            job_ttl_minutes: Some(60),
            batch_job_lifetime_minutes: 180,
            batch_job_log_level: "INFO".into(),
            system_customer_name: "SYSTEM".into(),
            aws_shard_count: 2,
            min_core_version: "1.0.0".into(),
            current_core_version: "1.2.0".into(),
            deployment_account_id: None,
        };
        let settings = convert_settings(raw).unwrap();
        assert_eq!(settings.deployment_mode, DeploymentMode::Server);
        assert_eq!(settings.event_partitions, 10);
    }
}
