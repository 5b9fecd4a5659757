use rse_domain::PolicyErrorKind;
use serde::{Deserialize, Serialize};

/// One policy's finding state for one location, as of `timestamp`.
///
/// If `error` is `None`, `resources` is the truth as of `timestamp` and
/// `previous_timestamp` is meaningless. If `error` is `Some`, `resources`
/// and `previous_timestamp` carry the last *successful* state; when
/// `previous_timestamp` is `None` the policy has never succeeded and
/// `resources` must be ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardPart {
    pub policy: String,
    pub location: String,
    pub timestamp: f64,
    #[serde(default)]
    pub resources: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_timestamp: Option<f64>,
}

impl ShardPart {
    pub fn key(&self) -> (String, String) {
        (self.policy.clone(), self.location.clone())
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// `Some(timestamp)` of the last run that produced valid `resources`;
    /// `None` means this policy never succeeded at this location.
    pub fn last_successful_timestamp(&self) -> Option<f64> {
        match self.error {
            None => Some(self.timestamp),
            Some(_) => self.previous_timestamp,
        }
    }

    /// Classified prefix of a `"kind:message"`-tagged error, per
    /// `PolicyErrorKind`.
    pub fn error_kind(&self) -> Option<PolicyErrorKind> {
        let raw = self.error.as_deref()?;
        let (kind, _) = raw.split_once(':')?;
        PolicyErrorKind::parse(kind)
    }

    pub fn error_message(&self) -> Option<&str> {
        let raw = self.error.as_deref()?;
        raw.split_once(':').map(|(_, msg)| msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_successful_timestamp_is_none_when_never_succeeded() {
        let part = ShardPart {
            policy: "p".into(),
            location: "us-east-1".into(),
            timestamp: 10.0,
            resources: vec![],
            error: Some("ACCESS:denied".into()),
            previous_timestamp: None,
        };
        assert_eq!(part.last_successful_timestamp(), None);
    }

    #[test]
    fn error_kind_and_message_split_on_first_colon() {
        let part = ShardPart {
            policy: "p".into(),
            location: "us-east-1".into(),
            timestamp: 10.0,
            resources: vec![],
            error: Some("CLIENT:rate limited: too many requests".into()),
            previous_timestamp: Some(5.0),
        };
        assert_eq!(part.error_kind(), Some(PolicyErrorKind::Client));
        assert_eq!(part.error_message(), Some("rate limited: too many requests"));
    }
}
