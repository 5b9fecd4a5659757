use std::collections::HashMap;

use rse_domain::{MitreTactic, ResourceExceptionId, Severity};
use rse_shards::{ShardPart, ShardsCollection, SingleShardDistributor};

use crate::collection::ExceptionCollection;

/// Severity/MITRE facets a rule contributes to an exception's summary,
/// looked up by policy name.
#[derive(Debug, Clone)]
pub struct RuleSummaryMeta {
    pub severity: Severity,
    pub mitre: Vec<MitreTactic>,
}

#[derive(Debug, Clone, Default)]
pub struct ExceptionSummary {
    pub exception_id: Option<ResourceExceptionId>,
    pub resource_count: usize,
    pub by_severity: HashMap<Severity, usize>,
    pub by_violation: HashMap<String, usize>,
    pub by_mitre_tactic: HashMap<String, usize>,
}

impl ExceptionSummary {
    fn new(exception_id: ResourceExceptionId) -> Self {
        Self { exception_id: Some(exception_id), ..Default::default() }
    }

    fn record(&mut self, policy: &str, meta: Option<&RuleSummaryMeta>) {
        self.resource_count += 1;
        *self.by_violation.entry(policy.to_string()).or_insert(0) += 1;
        if let Some(meta) = meta {
            *self.by_severity.entry(meta.severity).or_insert(0) += 1;
            for tactic in &meta.mitre {
                *self.by_mitre_tactic.entry(tactic.0.clone()).or_insert(0) += 1;
            }
        }
    }
}

/// Intersects `collection` against `exceptions`: matched resources are
/// grouped under their exception id into a summary (resource counts
/// bucketed by severity/violation/MITRE tactic, per `rule_meta`); unmatched
/// resources are placed back into a new collection. Error parts propagate
/// unchanged.
pub fn filter(
    collection: &ShardsCollection,
    exceptions: &ExceptionCollection,
    rule_meta: &HashMap<String, RuleSummaryMeta>,
) -> (Vec<ExceptionSummary>, ShardsCollection) {
    let mut summaries: HashMap<ResourceExceptionId, ExceptionSummary> = HashMap::new();
    let mut filtered = ShardsCollection::new(Box::new(SingleShardDistributor));

    for part in collection.iter_all_parts() {
        if part.has_error() {
            filtered.put_part(part.clone());
            continue;
        }

        let mut kept = Vec::with_capacity(part.resources.len());
        for resource in &part.resources {
            match exceptions.match_resource(resource) {
                Some(exception_id) => {
                    let meta = rule_meta.get(&part.policy);
                    summaries
                        .entry(exception_id.clone())
                        .or_insert_with(|| ExceptionSummary::new(exception_id.clone()))
                        .record(&part.policy, meta);
                }
                None => kept.push(resource.clone()),
            }
        }

        filtered.put_part(ShardPart {
            policy: part.policy.clone(),
            location: part.location.clone(),
            timestamp: part.timestamp,
            resources: kept,
            error: None,
            previous_timestamp: None,
        });
    }

    let mut summaries: Vec<ExceptionSummary> = summaries.into_values().collect();
    summaries.sort_by(|a, b| a.exception_id.as_ref().map(|e| e.as_str()).cmp(&b.exception_id.as_ref().map(|e| e.as_str())));
    (summaries, filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rse_domain::{ExceptionIdentity, ResourceException};
    use rse_shards::AwsRegionDistributor;

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
    fn matched_resources_are_grouped_into_a_summary_and_removed() {
        let mut collection = ShardsCollection::new(Box::new(AwsRegionDistributor::new(2)));
        collection.put_part(part(
            "ecc-aws-001-x",
            "us-east-1",
            vec![serde_json::json!({"id": "a", "arn": "arn:keep"}), serde_json::json!({"id": "b", "arn": "arn:exc"})],
        ));

        let excs = vec![ResourceException {
            id: ResourceExceptionId::new("E1"),
            tenant: None,
            customer: "C1".into(),
            identity: ExceptionIdentity::Arn { arn: "arn:exc".into() },
            expire_at: Utc::now() + chrono::Duration::days(1),
        }];
        let exceptions = ExceptionCollection::build(&excs, Utc::now());
        let mut rule_meta = HashMap::new();
        rule_meta.insert(
            "ecc-aws-001-x".to_string(),
            RuleSummaryMeta { severity: Severity::High, mitre: vec![MitreTactic("TA0001".into())] },
        );

        let (summaries, filtered) = filter(&collection, &exceptions, &rule_meta);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].resource_count, 1);
        assert_eq!(summaries[0].by_severity.get(&Severity::High), Some(&1));
        assert_eq!(summaries[0].by_mitre_tactic.get("TA0001"), Some(&1));

        let remaining: Vec<_> = filtered.iter_parts().flat_map(|p| p.resources.clone()).collect();
        assert_eq!(remaining, vec![serde_json::json!({"id": "a", "arn": "arn:keep"})]);
    }

    #[test]
    fn error_parts_propagate_unchanged() {
        let mut collection = ShardsCollection::new(Box::new(AwsRegionDistributor::new(2)));
        collection.put_part(ShardPart {
            policy: "P".into(),
            location: "us-east-1".into(),
            timestamp: 1.0,
            resources: vec![],
            error: Some("ACCESS:denied".into()),
            previous_timestamp: None,
        });
        let exceptions = ExceptionCollection::build(&[], Utc::now());
        let (_summaries, filtered) = filter(&collection, &exceptions, &HashMap::new());
        assert_eq!(filtered.iter_error_parts().count(), 1);
    }
}
