use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::distributor::{Distributor, SingleShardDistributor};
use crate::part::ShardPart;
use crate::shard::Shard;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleMeta {
    pub description: String,
    pub resource: String,
    pub comment: String,
}

/// `N -> Shard`, fronted by a [`Distributor`] that routes each part's
/// location to a shard index. Owned by `(tenant, jobId)`, `(tenant, latest)`
/// or `(platform, latest)`; produced by the scanner, mutated by the
/// diff/update path, read by reports/exceptions/recommendations.
pub struct ShardsCollection {
    distributor: Box<dyn Distributor>,
    shards: HashMap<u32, Shard>,
    pub meta: HashMap<String, RuleMeta>,
}

impl ShardsCollection {
    pub fn new(distributor: Box<dyn Distributor>) -> Self {
        Self { distributor, shards: HashMap::new(), meta: HashMap::new() }
    }

    pub fn shards_number(&self) -> u32 {
        self.distributor.shards_number()
    }

    /// Directly access/create the underlying shard `n`, for I/O round-trips.
    pub fn shard_mut(&mut self, n: u32) -> &mut Shard {
        self.shards.entry(n).or_default()
    }

    pub fn shard(&self, n: u32) -> Option<&Shard> {
        self.shards.get(&n)
    }

    pub fn iter_shards(&self) -> impl Iterator<Item = (u32, &Shard)> {
        (0..self.shards_number()).filter_map(|n| self.shards.get(&n).map(|s| (n, s)))
    }

    pub fn put_part(&mut self, part: ShardPart) {
        let n = self.distributor.distribute(&part.location);
        self.shards.entry(n).or_default().put(part);
    }

    /// Re-distributes every part of `other` into `self`.
    pub fn update(&mut self, other: &ShardsCollection) {
        for (_, shard) in other.iter_shards() {
            for part in shard.iter() {
                self.put_part(part.clone());
            }
        }
    }

    /// Parts that ever succeeded — `error.is_none() || previous_timestamp.is_some()`.
    pub fn iter_parts(&self) -> impl Iterator<Item = &ShardPart> {
        self.iter_shards()
            .flat_map(|(_, shard)| shard.iter())
            .filter(|part| part.error.is_none() || part.previous_timestamp.is_some())
    }

    pub fn iter_all_parts(&self) -> impl Iterator<Item = &ShardPart> {
        self.iter_shards().flat_map(|(_, shard)| shard.iter())
    }

    pub fn iter_error_parts(&self) -> impl Iterator<Item = &ShardPart> {
        self.iter_shards().flat_map(|(_, shard)| shard.iter()).filter(|part| part.error.is_some())
    }

    /// `self - other`, always distributed with [`SingleShardDistributor`].
    ///
    /// For each of `self`'s ever-succeeded parts: keep unchanged if `other`
    /// has no matching `(policy, location)` part, if `self`'s part is
    /// currently erroring, or if `other`'s matching part never succeeded;
    /// otherwise produce a part whose resources are the set-difference of
    /// `self`'s resources minus `other`'s, dropping error/previous_timestamp.
    pub fn difference(&self, other: &ShardsCollection) -> ShardsCollection {
        let mut result = ShardsCollection::new(Box::new(SingleShardDistributor));
        for part in self.iter_parts() {
            let existing = other
                .iter_shards()
                .flat_map(|(_, shard)| shard.iter())
                .find(|p| p.policy == part.policy && p.location == part.location);

            let Some(existing) = existing else {
                result.put_part(part.clone());
                continue;
            };
            if part.error.is_some() {
                result.put_part(part.clone());
                continue;
            }
            if existing.last_successful_timestamp().is_none() {
                result.put_part(part.clone());
                continue;
            }

            let old: HashSet<String> = existing.resources.iter().map(canonical_key).collect();
            let diff: Vec<serde_json::Value> = part
                .resources
                .iter()
                .filter(|r| !old.contains(&canonical_key(r)))
                .cloned()
                .collect();

            result.put_part(ShardPart {
                policy: part.policy.clone(),
                location: part.location.clone(),
                timestamp: part.timestamp,
                resources: diff,
                error: None,
                previous_timestamp: None,
            });
        }
        result
    }
}

/// Canonical string key for resource set-membership comparisons — sorts
/// object keys recursively so field ordering doesn't affect equality.
fn canonical_key(value: &serde_json::Value) -> String {
    serde_json::to_string(&sort_json_keys(value.clone())).unwrap_or_default()
}

fn sort_json_keys(v: serde_json::Value) -> serde_json::Value {
    match v {
        serde_json::Value::Object(map) => {
            let sorted: std::collections::BTreeMap<String, serde_json::Value> =
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
    use crate::distributor::AwsRegionDistributor;

    fn part(policy: &str, location: &str, resources: Vec<serde_json::Value>) -> ShardPart {
        ShardPart {
            policy: policy.into(),
            location: location.into(),
            timestamp: 100.0,
            resources,
            error: None,
            previous_timestamp: None,
        }
    }

    #[test]
    fn put_part_routes_through_distributor() {
        let mut collection = ShardsCollection::new(Box::new(AwsRegionDistributor::new(2)));
        collection.put_part(part("P", "us-east-1", vec![]));
        let n = AwsRegionDistributor::new(2).distribute("us-east-1");
        assert!(collection.shard(n).is_some());
    }

    #[test]
    fn iter_parts_excludes_never_succeeded_errors() {
        let mut collection = ShardsCollection::new(Box::new(SingleShardDistributor));
        collection.put_part(ShardPart {
            policy: "P".into(),
            location: "global".into(),
            timestamp: 1.0,
            resources: vec![],
            error: Some("ACCESS:denied".into()),
            previous_timestamp: None,
        });
        assert_eq!(collection.iter_parts().count(), 0);
        assert_eq!(collection.iter_error_parts().count(), 1);
    }

    #[test]
    fn difference_yields_only_new_resources() {
        let mut new = ShardsCollection::new(Box::new(SingleShardDistributor));
        new.put_part(part("P", "R", vec![serde_json::json!({"id": "a"}), serde_json::json!({"id": "b"})]));

        let mut old = ShardsCollection::new(Box::new(SingleShardDistributor));
        old.put_part(part("P", "R", vec![serde_json::json!({"id": "a"})]));

        let diff = new.difference(&old);
        let parts: Vec<_> = diff.iter_parts().collect();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].resources, vec![serde_json::json!({"id": "b"})]);
    }
}
