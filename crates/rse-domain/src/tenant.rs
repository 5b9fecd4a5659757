use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{CustomerName, TenantName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Cloud {
    Aws,
    Azure,
    Google,
    Kubernetes,
}

impl Cloud {
    /// Azure/GCP can only be scanned at `global` scope; AWS/K8s are
    /// region-addressable.
    pub fn is_region_addressable(self) -> bool {
        matches!(self, Cloud::Aws | Cloud::Kubernetes)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "AWS" => Some(Cloud::Aws),
            "AZURE" => Some(Cloud::Azure),
            "GOOGLE" | "GCP" => Some(Cloud::Google),
            "KUBERNETES" | "K8S" => Some(Cloud::Kubernetes),
            _ => None,
        }
    }
}

impl fmt::Display for Cloud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Cloud::Aws => "AWS",
            Cloud::Azure => "AZURE",
            Cloud::Google => "GOOGLE",
            Cloud::Kubernetes => "KUBERNETES",
        };
        write!(f, "{}", s)
    }
}

pub const GLOBAL_REGION: &str = "global";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub name: TenantName,
    pub customer: CustomerName,
    pub cloud: Cloud,
    /// Cloud account / subscription / project id.
    pub project: String,
    pub active_regions: Vec<String>,
    pub is_active: bool,
}

impl Tenant {
    pub fn has_region(&self, region: &str) -> bool {
        self.active_regions.iter().any(|r| r == region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_parse_is_case_insensitive() {
        assert_eq!(Cloud::parse("aws"), Some(Cloud::Aws));
        assert_eq!(Cloud::parse("GOOGLE"), Some(Cloud::Google));
        assert_eq!(Cloud::parse("bogus"), None);
    }

    #[test]
    fn only_aws_and_k8s_are_region_addressable() {
        assert!(Cloud::Aws.is_region_addressable());
        assert!(Cloud::Kubernetes.is_region_addressable());
        assert!(!Cloud::Azure.is_region_addressable());
        assert!(!Cloud::Google.is_region_addressable());
    }
}
