use std::collections::HashMap;
use std::sync::OnceLock;

use rse_domain::GLOBAL_REGION;

/// Order-frozen, append-only public AWS region list carried verbatim from
/// the original sharding implementation — reordering would invalidate every
/// historical shard key, so new regions may only be appended at the end.
pub const AWS_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "ap-south-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-southeast-1",
    "ap-southeast-2",
    "ca-central-1",
    "eu-central-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-north-1",
    "sa-east-1",
    "ap-southeast-3",
    "ap-southeast-4",
    "af-south-1",
    "ap-east-1",
    "ap-south-2",
    "eu-south-1",
    "eu-south-2",
    "eu-central-2",
    "il-central-1",
    "me-south-1",
    "me-central-1",
    "us-gov-east-1",
    "us-gov-west-1",
];

/// Routes a `ShardPart`'s location to a shard index in `[0, shards_number())`.
pub trait Distributor: Send + Sync {
    fn shards_number(&self) -> u32;
    fn distribute(&self, location: &str) -> u32;
}

/// Used for Azure, GCP and Kubernetes: those clouds scan global project
/// scope, so sharding by region buys nothing.
#[derive(Debug, Clone, Copy)]
pub struct SingleShardDistributor;

impl Distributor for SingleShardDistributor {
    fn shards_number(&self) -> u32 {
        1
    }

    fn distribute(&self, _location: &str) -> u32 {
        0
    }
}

fn region_index_map() -> &'static HashMap<&'static str, u32> {
    static MAP: OnceLock<HashMap<&'static str, u32>> = OnceLock::new();
    MAP.get_or_init(|| {
        std::iter::once(GLOBAL_REGION)
            .chain(AWS_REGIONS.iter().copied())
            .enumerate()
            .map(|(i, r)| (r, i as u32))
            .collect()
    })
}

#[derive(Debug, Clone, Copy)]
pub struct AwsRegionDistributor {
    n: u32,
}

impl AwsRegionDistributor {
    pub fn new(n: u32) -> Self {
        assert!(n > 0, "AwsRegionDistributor needs at least one shard");
        Self { n }
    }
}

impl Distributor for AwsRegionDistributor {
    fn shards_number(&self) -> u32 {
        self.n
    }

    fn distribute(&self, location: &str) -> u32 {
        let map = region_index_map();
        let index = map.get(location).copied().unwrap_or(map.len() as u32);
        index % self.n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_shard_always_routes_to_zero() {
        let d = SingleShardDistributor;
        assert_eq!(d.distribute("anything"), 0);
        assert_eq!(d.shards_number(), 1);
    }

    #[test]
    fn aws_region_distributor_routes_known_regions_by_fixed_index() {
        let d = AwsRegionDistributor::new(2);
        assert_eq!(d.distribute(GLOBAL_REGION), 0);
        assert_eq!(d.distribute("us-east-1"), 1 % 2);
        assert_eq!(d.distribute("us-east-2"), 2 % 2);
    }

    #[test]
    fn aws_region_distributor_routes_unknown_region_past_the_list_end() {
        let d = AwsRegionDistributor::new(2);
        let known_count = (AWS_REGIONS.len() + 1) as u32;
        assert_eq!(d.distribute("mars-central-1"), known_count % 2);
    }
}
