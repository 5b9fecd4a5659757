//! Blob-store key templates for the control plane's S3 layout.

pub fn standard_ruleset_key(customer: &str, name: &str, version: &str) -> String {
    format!("rulesets/standard/{customer}/{name}/{version}.json.gz")
}

pub fn licensed_ruleset_key(license_key: &str, ruleset_id: &str) -> String {
    format!("rulesets/licensed/{license_key}/{ruleset_id}.json.gz")
}

pub fn event_mapping_key(license_key: &str, version: &str, cloud: &str) -> String {
    let cloud = cloud.to_ascii_lowercase();
    format!("rulesets/mappings/{license_key}/{version}/events/{cloud}.json.gz")
}

pub fn report_shard_key(customer: &str, cloud: &str, tenant: &str, job_id: &str, shard: u32) -> String {
    format!("reports/{customer}/{cloud}/{tenant}/{job_id}/{shard}.json.gz")
}

pub fn report_meta_key(customer: &str, cloud: &str, tenant: &str, job_id: &str) -> String {
    format!("reports/{customer}/{cloud}/{tenant}/{job_id}/meta.json.gz")
}

pub fn report_latest_shard_key(customer: &str, cloud: &str, tenant: &str, shard: u32) -> String {
    format!("reports/{customer}/{cloud}/{tenant}/latest/{shard}.json.gz")
}

pub fn report_latest_meta_key(customer: &str, cloud: &str, tenant: &str) -> String {
    format!("reports/{customer}/{cloud}/{tenant}/latest/meta.json.gz")
}

pub fn recommendation_key(
    customer: &str,
    cloud: &str,
    tenant: &str,
    timestamp: &str,
    region: &str,
) -> String {
    format!("recommendations/{customer}/{cloud}/{tenant}/{timestamp}/{region}.jsonl")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_ruleset_key_matches_spec_layout() {
        assert_eq!(
            standard_ruleset_key("C1", "RS-AWS-CORE", "1.0.0"),
            "rulesets/standard/C1/RS-AWS-CORE/1.0.0.json.gz"
        );
    }

    #[test]
    fn event_mapping_key_lowercases_cloud() {
        assert_eq!(
            event_mapping_key("L1", "3", "AWS"),
            "rulesets/mappings/L1/3/events/aws.json.gz"
        );
    }

    #[test]
    fn report_latest_mirrors_job_layout_shape() {
        assert_eq!(
            report_latest_shard_key("C1", "AWS", "T1", 0),
            "reports/C1/AWS/T1/latest/0.json.gz"
        );
    }
}
