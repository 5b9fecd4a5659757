use std::collections::HashMap;

use rse_domain::{Cloud, Rule};

/// `source -> eventName -> []ruleName` for one cloud.
pub type EventMapping = HashMap<String, HashMap<String, Vec<String>>>;

/// For every rule with non-empty `events`, for each `(source, [eventName])`,
/// insert `ruleName` into `cloud -> source -> eventName -> []ruleName`. Rule
/// order is not meaningful; a rule name is inserted at most once per event
/// name even if two metadata entries name the same pair.
pub fn build_mappings(rules: &[Rule]) -> HashMap<Cloud, EventMapping> {
    let mut mappings: HashMap<Cloud, EventMapping> = HashMap::new();
    for rule in rules {
        if rule.events.is_empty() {
            continue;
        }
        let mapping = mappings.entry(rule.cloud).or_default();
        for meta_event in &rule.events {
            let event_map = mapping.entry(meta_event.source.clone()).or_default();
            for event_name in &meta_event.event_names {
                let names = event_map.entry(event_name.clone()).or_default();
                if !names.contains(&rule.name) {
                    names.push(rule.name.clone());
                }
            }
        }
    }
    mappings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rse_domain::{CustomerName, RuleCommentMeta, RuleLocation, RuleMetaEvent, Severity};

    fn rule(name: &str, cloud: Cloud, events: Vec<RuleMetaEvent>) -> Rule {
        Rule {
            id: format!("C1#{cloud}#{name}#1.0.0"),
            name: name.into(),
            resource: "aws.s3".into(),
            filters: serde_json::json!([]),
            location: RuleLocation { project: "p".into(), git_ref: "main".into(), path: "x.yaml".into() },
            commit_hash: "abc".into(),
            updated_date: Utc::now(),
            customer: CustomerName::new("C1"),
            severity: Severity::Medium,
            mitre: vec![],
            events,
            comment_meta: RuleCommentMeta::default(),
            cloud,
        }
    }

    #[test]
    fn builds_per_cloud_source_event_rule_map() {
        let rules = vec![
            rule(
                "ecc-aws-001-x",
                Cloud::Aws,
                vec![RuleMetaEvent { source: "s3.amazonaws.com".into(), event_names: vec!["DeleteBucket".into()] }],
            ),
            rule("ecc-aws-002-y", Cloud::Aws, vec![]),
        ];
        let mappings = build_mappings(&rules);
        let aws = mappings.get(&Cloud::Aws).unwrap();
        let rule_names = &aws["s3.amazonaws.com"]["DeleteBucket"];
        assert_eq!(rule_names, &vec!["ecc-aws-001-x".to_string()]);
        assert!(!mappings.contains_key(&Cloud::Azure));
    }

    #[test]
    fn duplicate_event_entries_do_not_duplicate_the_rule_name() {
        let rules = vec![rule(
            "ecc-aws-001-x",
            Cloud::Aws,
            vec![
                RuleMetaEvent { source: "s3.amazonaws.com".into(), event_names: vec!["DeleteBucket".into()] },
                RuleMetaEvent { source: "s3.amazonaws.com".into(), event_names: vec!["DeleteBucket".into()] },
            ],
        )];
        let mappings = build_mappings(&rules);
        let rule_names = &mappings[&Cloud::Aws]["s3.amazonaws.com"]["DeleteBucket"];
        assert_eq!(rule_names.len(), 1);
    }
}
