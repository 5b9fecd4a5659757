use serde::{Deserialize, Serialize};

use crate::ids::{CustomerName, RuleSourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleSourceType {
    Github,
    Gitlab,
    GithubRelease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SyncStatus {
    Synced,
    Syncing,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestSync {
    pub release_tag: Option<String>,
    pub commit_hash: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub status: SyncStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSource {
    pub id: RuleSourceId,
    pub customer: CustomerName,
    #[serde(rename = "type")]
    pub source_type: RuleSourceType,
    pub latest_sync: LatestSync,
}

impl RuleSource {
    /// A `GITHUB_RELEASE` source whose latest sync tag is valid SemVer can be
    /// used to auto-resolve a ruleset's desired version.
    pub fn resolvable_release_version(&self) -> Option<&str> {
        if self.source_type != RuleSourceType::GithubRelease {
            return None;
        }
        let tag = self.latest_sync.release_tag.as_deref()?;
        crate::ruleset::RulesetVersion::parse(tag)?;
        Some(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn source(source_type: RuleSourceType, tag: Option<&str>) -> RuleSource {
        RuleSource {
            id: RuleSourceId::new("rs-1"),
            customer: CustomerName::new("C1"),
            source_type,
            latest_sync: LatestSync {
                release_tag: tag.map(String::from),
                commit_hash: None,
                timestamp: Utc::now(),
                status: SyncStatus::Synced,
            },
        }
    }

    #[test]
    fn non_release_source_never_resolves_a_version() {
        let s = source(RuleSourceType::Github, Some("1.0.0"));
        assert!(s.resolvable_release_version().is_none());
    }

    #[test]
    fn release_source_with_non_semver_tag_does_not_resolve() {
        let s = source(RuleSourceType::GithubRelease, Some("latest"));
        assert!(s.resolvable_release_version().is_none());
    }

    #[test]
    fn release_source_with_semver_tag_resolves() {
        let s = source(RuleSourceType::GithubRelease, Some("2.1.0"));
        assert_eq!(s.resolvable_release_version(), Some("2.1.0"));
    }
}
