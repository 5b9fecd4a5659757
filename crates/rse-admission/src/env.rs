use std::collections::HashMap;

use rse_config::Settings;
use rse_domain::Job;

/// Distinguishes the job submission path for the `JOB_TYPE` executor env
/// var.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorJobType {
    Standard,
    EventDriven,
    Scheduled,
}

impl ExecutorJobType {
    fn as_env_value(self) -> &'static str {
        match self {
            ExecutorJobType::Standard => "standard",
            ExecutorJobType::EventDriven => "event-driven-multi-account",
            ExecutorJobType::Scheduled => "scheduled",
        }
    }
}

/// Builds the environment handed to the executor for one job submission:
/// bucket names, AWS region, job lifetime/log level, core-version
/// compatibility bounds, job identity, resolved rulesets/regions, and any
/// credentials/affected license.
pub fn build_job_env(
    settings: &Settings,
    job: &Job,
    job_type: ExecutorJobType,
    batch_results_ids: &[String],
) -> HashMap<String, String> {
    let mut env = HashMap::new();
    env.insert("CUSTODIAN_JOB_ID".into(), job.id.to_string());
    if job.cloud == rse_domain::Cloud::Aws {
        env.insert("TARGET_REGIONS".into(), job.regions.join(","));
    }
    env.insert(
        "RULESETS".into(),
        job.rulesets.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(","),
    );
    if !batch_results_ids.is_empty() {
        env.insert("BATCH_RESULTS_IDS".into(), batch_results_ids.join(","));
    }
    if let Some(license) = &job.affected_license {
        env.insert("AFFECTED_LICENSES".into(), license.to_string());
    }
    env.insert("JOB_TYPE".into(), job_type.as_env_value().to_string());
    env.insert("SUBMITTED_AT".into(), job.submitted_at.to_rfc3339());
    if let Some(key) = &job.credentials_key {
        env.insert("CREDENTIALS_KEY".into(), key.clone());
    }
    if let Some(platform_id) = &job.platform_id {
        env.insert("PLATFORM_ID".into(), platform_id.clone());
    }
    env.insert("SYSTEM_CUSTOMER_NAME".into(), settings.system_customer_name.clone());
    env.insert("BATCH_JOB_LIFETIME_MINUTES".into(), settings.batch_job_lifetime_minutes.to_string());
    env.insert("BATCH_JOB_LOG_LEVEL".into(), settings.batch_job_log_level.clone());
    env.insert("MIN_CORE_VERSION".into(), settings.min_core_version.clone());
    env.insert("CURRENT_CORE_VERSION".into(), settings.current_core_version.clone());
    env.insert("RULESETS_BUCKET".into(), settings.buckets.rulesets.clone());
    env.insert("REPORTS_BUCKET".into(), settings.buckets.reports.clone());
    env.insert("RECOMMENDATIONS_BUCKET".into(), settings.buckets.recommendations.clone());
    env.insert("AWS_REGION".into(), settings.aws_region.clone());
    env
}

/// Builds the environment for an event-driven batch submission: no single
/// `Job` backs this run, so `BATCH_RESULTS_IDS` stands in for
/// `CUSTODIAN_JOB_ID`/`TARGET_REGIONS`/`RULESETS`, which this env omits.
pub fn build_event_driven_env(
    settings: &Settings,
    batch_results_ids: &[String],
    submitted_at: chrono::DateTime<chrono::Utc>,
) -> HashMap<String, String> {
    let mut env = HashMap::new();
    env.insert("BATCH_RESULTS_IDS".into(), batch_results_ids.join(","));
    env.insert("JOB_TYPE".into(), ExecutorJobType::EventDriven.as_env_value().to_string());
    env.insert("SUBMITTED_AT".into(), submitted_at.to_rfc3339());
    env.insert("SYSTEM_CUSTOMER_NAME".into(), settings.system_customer_name.clone());
    env.insert("BATCH_JOB_LIFETIME_MINUTES".into(), settings.batch_job_lifetime_minutes.to_string());
    env.insert("BATCH_JOB_LOG_LEVEL".into(), settings.batch_job_log_level.clone());
    env.insert("MIN_CORE_VERSION".into(), settings.min_core_version.clone());
    env.insert("CURRENT_CORE_VERSION".into(), settings.current_core_version.clone());
    env.insert("RULESETS_BUCKET".into(), settings.buckets.rulesets.clone());
    env.insert("REPORTS_BUCKET".into(), settings.buckets.reports.clone());
    env.insert("RECOMMENDATIONS_BUCKET".into(), settings.buckets.recommendations.clone());
    env.insert("AWS_REGION".into(), settings.aws_region.clone());
    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rse_config::{BucketNames, DeploymentMode};
    use rse_domain::{Cloud, JobId, JobStatus, TenantName};

    fn settings() -> Settings {
        Settings {
            deployment_mode: DeploymentMode::Server,
            buckets: BucketNames {
                rulesets: "rulesets-bucket".into(),
                reports: "reports-bucket".into(),
                recommendations: "recs-bucket".into(),
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
        }
    }

    fn job() -> Job {
        Job {
            id: JobId::new("job-1"),
            tenant_name: TenantName::new("T1"),
            customer: "C1".into(),
            cloud: Cloud::Aws,
            regions: vec!["us-east-1".into()],
            rulesets: vec![],
            rules_to_scan: None,
            status: JobStatus::Pending,
            submitted_at: Utc::now(),
            batch_job_id: None,
            credentials_key: None,
            affected_license: None,
            platform_id: None,
            ttl: None,
            reason: None,
            scheduled_job_name: None,
        }
    }

    #[test]
    fn builds_required_keys() {
        let env = build_job_env(&settings(), &job(), ExecutorJobType::Standard, &[]);
        assert_eq!(env.get("CUSTODIAN_JOB_ID"), Some(&"job-1".to_string()));
        assert_eq!(env.get("JOB_TYPE"), Some(&"standard".to_string()));
        assert_eq!(env.get("RULESETS_BUCKET"), Some(&"rulesets-bucket".to_string()));
        assert_eq!(env.get("TARGET_REGIONS"), Some(&"us-east-1".to_string()));
        assert!(!env.contains_key("BATCH_RESULTS_IDS"));
        assert!(!env.contains_key("CREDENTIALS_KEY"));
    }

    #[test]
    fn omits_target_regions_for_non_aws_clouds() {
        let mut j = job();
        j.cloud = Cloud::Kubernetes;
        j.platform_id = Some("plat-1".into());
        let env = build_job_env(&settings(), &j, ExecutorJobType::Standard, &[]);
        assert!(!env.contains_key("TARGET_REGIONS"));
        assert_eq!(env.get("PLATFORM_ID"), Some(&"plat-1".to_string()));
    }

    #[test]
    fn includes_batch_results_ids_when_present() {
        let env = build_job_env(&settings(), &job(), ExecutorJobType::EventDriven, &["br-1".into(), "br-2".into()]);
        assert_eq!(env.get("BATCH_RESULTS_IDS"), Some(&"br-1,br-2".to_string()));
        assert_eq!(env.get("JOB_TYPE"), Some(&"event-driven-multi-account".to_string()));
    }

    #[test]
    fn event_driven_env_omits_job_specific_keys() {
        let env = build_event_driven_env(&settings(), &["br-1".into()], Utc::now());
        assert_eq!(env.get("BATCH_RESULTS_IDS"), Some(&"br-1".to_string()));
        assert_eq!(env.get("JOB_TYPE"), Some(&"event-driven-multi-account".to_string()));
        assert!(!env.contains_key("CUSTODIAN_JOB_ID"));
        assert!(!env.contains_key("TARGET_REGIONS"));
        assert!(!env.contains_key("RULESETS"));
    }
}
