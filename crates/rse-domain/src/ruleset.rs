use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{CustomerName, LicenseKey, RulesetId};
use crate::tenant::Cloud;

/// SemVer `major.minor.patch`, or `EMPTY` when a ruleset has never been
/// released under an explicit version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RulesetVersion {
    Empty,
    Semver { major: u32, minor: u32, patch: u32 },
}

impl RulesetVersion {
    pub fn parse(s: &str) -> Option<Self> {
        if s.is_empty() || s.eq_ignore_ascii_case("EMPTY") {
            return Some(RulesetVersion::Empty);
        }
        let mut parts = s.splitn(3, '.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = parts.next()?.parse().ok()?;
        Some(RulesetVersion::Semver { major, minor, patch })
    }

    pub fn bump_minor(&self) -> Self {
        match self {
            RulesetVersion::Empty => RulesetVersion::Semver { major: 1, minor: 0, patch: 0 },
            RulesetVersion::Semver { major, minor, .. } => {
                RulesetVersion::Semver { major: *major, minor: minor + 1, patch: 0 }
            }
        }
    }
}

impl fmt::Display for RulesetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RulesetVersion::Empty => write!(f, "EMPTY"),
            RulesetVersion::Semver { major, minor, patch } => write!(f, "{major}.{minor}.{patch}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Path {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    pub id: RulesetId,
    pub customer: CustomerName,
    pub name: String,
    pub version: RulesetVersion,
    pub cloud: Cloud,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    pub rules: Vec<String>,
    pub licensed: bool,
    pub event_driven: bool,
    pub s3_path: S3Path,
    pub license_keys: HashSet<LicenseKey>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Ruleset {
    /// Licensed rulesets belong to the SYSTEM customer and carry
    /// `licensed=true`; standard (tenant-local) rulesets never do.
    pub fn is_licensed_shape_valid(&self, system_customer: &CustomerName) -> bool {
        if self.licensed {
            &self.customer == system_customer
        } else {
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_parses_semver() {
        assert_eq!(
            RulesetVersion::parse("1.2.3"),
            Some(RulesetVersion::Semver { major: 1, minor: 2, patch: 3 })
        );
    }

    #[test]
    fn version_parses_empty_sentinel() {
        assert_eq!(RulesetVersion::parse("EMPTY"), Some(RulesetVersion::Empty));
        assert_eq!(RulesetVersion::parse(""), Some(RulesetVersion::Empty));
    }

    #[test]
    fn version_rejects_malformed_input() {
        assert_eq!(RulesetVersion::parse("not-a-version"), None);
        assert_eq!(RulesetVersion::parse("1.2"), None);
    }

    #[test]
    fn bump_minor_resets_patch() {
        let v = RulesetVersion::Semver { major: 1, minor: 0, patch: 5 };
        assert_eq!(v.bump_minor(), RulesetVersion::Semver { major: 1, minor: 1, patch: 0 });
    }

    #[test]
    fn display_round_trips_through_parse() {
        let v = RulesetVersion::Semver { major: 2, minor: 3, patch: 4 };
        assert_eq!(RulesetVersion::parse(&v.to_string()), Some(v));
    }
}
