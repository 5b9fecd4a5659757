use serde::{Deserialize, Serialize};

use crate::ids::CustomerName;
use crate::tenant::Cloud;

/// `{INFO,LOW,MEDIUM,HIGH,CRITICAL}` — sourced from each rule's `comment`
/// metadata blob, needed by the exceptions filter's by-severity summary
/// bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// MITRE ATT&CK tactic id (e.g. `TA0001`) carried on a rule's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MitreTactic(pub String);

/// `location = project#ref#path` — where a rule's source text lives in its
/// git project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleLocation {
    pub project: String,
    pub git_ref: String,
    pub path: String,
}

impl RuleLocation {
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.splitn(3, '#');
        let project = parts.next()?.to_string();
        let git_ref = parts.next()?.to_string();
        let path = parts.next()?.to_string();
        Some(Self { project, git_ref, path })
    }
}

/// `id = customer#cloud#name#version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMetaEvent {
    pub source: String,
    pub event_names: Vec<String>,
}

/// The `platforms`/`categories`/`serviceSections`/`sources` facets parsed
/// from a rule's `comment` metadata blob, used by the ruleset create
/// pipeline's mapping filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCommentMeta {
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub service_sections: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub resource: String,
    pub filters: serde_json::Value,
    pub location: RuleLocation,
    pub commit_hash: String,
    pub updated_date: chrono::DateTime<chrono::Utc>,
    pub customer: CustomerName,
    pub severity: Severity,
    pub mitre: Vec<MitreTactic>,
    /// per-cloud `(source, [eventName])` pairs this rule reacts to, parsed
    /// from `comment` — consumed by the event mapping collector.
    pub events: Vec<RuleMetaEvent>,
    #[serde(default)]
    pub comment_meta: RuleCommentMeta,
    pub cloud: Cloud,
}

impl Rule {
    pub fn build_id(customer: &CustomerName, cloud: Cloud, name: &str, version: &str) -> String {
        format!("{customer}#{cloud}#{name}#{version}")
    }

    /// The policy document this rule contributes to a ruleset bundle.
    pub fn build_policy(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "resource": self.resource,
            "filters": self.filters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_location_parses_three_hash_separated_parts() {
        let loc = RuleLocation::parse("epam/rules#main#aws/s3.yaml").unwrap();
        assert_eq!(loc.project, "epam/rules");
        assert_eq!(loc.git_ref, "main");
        assert_eq!(loc.path, "aws/s3.yaml");
    }

    #[test]
    fn rule_location_rejects_too_few_parts() {
        assert!(RuleLocation::parse("only-one-part").is_none());
    }

    #[test]
    fn build_id_matches_customer_cloud_name_version_shape() {
        let id = Rule::build_id(&CustomerName::new("C1"), Cloud::Aws, "ecc-aws-001-x", "1.0.0");
        assert_eq!(id, "C1#AWS#ecc-aws-001-x#1.0.0");
    }
}
