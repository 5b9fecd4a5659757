use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::part::ShardPart;

/// `(policy, location) -> ShardPart`, merge-friendly under late/out-of-order
/// puts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shard {
    parts: HashMap<(String, String), ShardPart>,
}

impl Shard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn get(&self, policy: &str, location: &str) -> Option<&ShardPart> {
        self.parts.get(&(policy.to_string(), location.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShardPart> {
        self.parts.values()
    }

    /// Merge `part` in. Late/duplicate timestamps are dropped; an incoming
    /// error coalesces `previous_timestamp` from whichever of
    /// `existing.timestamp` / `existing.previous_timestamp` is still
    /// meaningful, so an error on top of an error keeps the *original*
    /// last-good timestamp rather than the immediately-prior error's.
    pub fn put(&mut self, part: ShardPart) {
        let key = part.key();
        let Some(existing) = self.parts.get(&key) else {
            self.parts.insert(key, part);
            return;
        };
        if existing.timestamp > part.timestamp {
            return;
        }
        let merged = if part.error.is_some() {
            let previous_timestamp = if existing.error.is_none() {
                Some(existing.timestamp)
            } else {
                existing.previous_timestamp
            };
            ShardPart {
                policy: part.policy,
                location: part.location,
                timestamp: part.timestamp,
                resources: existing.resources.clone(),
                error: part.error,
                previous_timestamp,
            }
        } else {
            part
        };
        self.parts.insert(key, merged);
    }

    pub fn pop(&mut self, policy: &str, location: &str) -> Option<ShardPart> {
        self.parts.remove(&(policy.to_string(), location.to_string()))
    }

    pub fn update(&mut self, other: &Shard) {
        for part in other.iter() {
            self.put(part.clone());
        }
    }
}

impl IntoIterator for Shard {
    type Item = ShardPart;
    type IntoIter = std::collections::hash_map::IntoValues<(String, String), ShardPart>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(ts: f64, error: Option<&str>, previous_timestamp: Option<f64>) -> ShardPart {
        ShardPart {
            policy: "p".into(),
            location: "us-east-1".into(),
            timestamp: ts,
            resources: vec![serde_json::json!({"id": "a"})],
            error: error.map(String::from),
            previous_timestamp,
        }
    }

    #[test]
    fn put_drops_late_arriving_part() {
        let mut shard = Shard::new();
        shard.put(part(10.0, None, None));
        shard.put(part(5.0, None, None));
        assert_eq!(shard.get("p", "us-east-1").unwrap().timestamp, 10.0);
    }

    #[test]
    fn put_replaces_outright_when_no_error() {
        let mut shard = Shard::new();
        shard.put(part(10.0, None, None));
        shard.put(part(20.0, None, None));
        assert_eq!(shard.get("p", "us-east-1").unwrap().timestamp, 20.0);
    }

    #[test]
    fn put_coalesces_previous_timestamp_from_last_good_state_on_first_error() {
        let mut shard = Shard::new();
        shard.put(part(10.0, None, None));
        shard.put(part(20.0, Some("ACCESS:denied"), None));
        let merged = shard.get("p", "us-east-1").unwrap();
        assert_eq!(merged.previous_timestamp, Some(10.0));
        assert_eq!(merged.resources.len(), 1);
    }

    #[test]
    fn put_keeps_original_last_good_timestamp_across_consecutive_errors() {
        let mut shard = Shard::new();
        shard.put(part(10.0, None, None));
        shard.put(part(20.0, Some("ACCESS:denied"), None));
        shard.put(part(30.0, Some("CLIENT:timeout"), Some(999.0)));
        let merged = shard.get("p", "us-east-1").unwrap();
        assert_eq!(merged.previous_timestamp, Some(10.0));
    }
}
