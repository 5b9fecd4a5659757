use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

/// Canonical content hash of a `name -> policy` bundle: sort object keys
/// recursively (so HashMap iteration order never affects the hash), then
/// SHA-256 the canonical bytes. Generalizes `compute_desired_hash` from
/// hashing one state object to hashing an entire ruleset's policy map, so a
/// no-op update (same rules, same policies) is detected before a new
/// version is minted.
pub fn compute_bundle_hash(policies: &BTreeMap<String, serde_json::Value>) -> String {
    let value = serde_json::to_value(policies).unwrap_or(serde_json::Value::Null);
    let canonical = sort_json_keys(value);
    let bytes = serde_json::to_vec(&canonical).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    format!("{digest:x}")
}

fn sort_json_keys(v: serde_json::Value) -> serde_json::Value {
    match v {
        serde_json::Value::Object(map) => {
            let sorted: BTreeMap<String, serde_json::Value> =
                map.into_iter().map(|(k, v)| (k, sort_json_keys(v))).collect();
            serde_json::Value::Object(sorted.into_iter().collect())
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(sort_json_keys).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_across_key_insertion_order() {
        let mut a = BTreeMap::new();
        a.insert("rule-a".to_string(), serde_json::json!({"resource": "aws.s3", "filters": []}));
        a.insert("rule-b".to_string(), serde_json::json!({"resource": "aws.ec2", "filters": []}));

        let mut b = BTreeMap::new();
        b.insert("rule-b".to_string(), serde_json::json!({"filters": [], "resource": "aws.ec2"}));
        b.insert("rule-a".to_string(), serde_json::json!({"filters": [], "resource": "aws.s3"}));

        assert_eq!(compute_bundle_hash(&a), compute_bundle_hash(&b));
    }

    #[test]
    fn hash_changes_when_content_changes() {
        let mut a = BTreeMap::new();
        a.insert("rule-a".to_string(), serde_json::json!({"resource": "aws.s3"}));
        let mut b = BTreeMap::new();
        b.insert("rule-a".to_string(), serde_json::json!({"resource": "aws.ec2"}));
        assert_ne!(compute_bundle_hash(&a), compute_bundle_hash(&b));
    }
}
