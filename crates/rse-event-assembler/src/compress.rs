use std::collections::{BTreeSet, HashMap};

use rse_domain::RegionRuleMap;

/// Compresses a `region -> []ruleName` map into a `CSV(sorted regions) ->
/// []ruleName` map when doing so shrinks the payload: invert to
/// `rule -> set<region>`, then group rules that share an identical region
/// set under one CSV key. A single-region map gains nothing from the
/// inversion, so it's left as `PerRegion`.
pub fn compress_region_rule_map(map: HashMap<String, Vec<String>>) -> RegionRuleMap {
    if map.len() <= 1 {
        return RegionRuleMap::PerRegion(map);
    }

    let mut rule_to_regions: HashMap<String, BTreeSet<String>> = HashMap::new();
    for (region, rules) in &map {
        for rule in rules {
            rule_to_regions.entry(rule.clone()).or_default().insert(region.clone());
        }
    }

    let mut by_region_csv: HashMap<String, Vec<String>> = HashMap::new();
    for (rule, regions) in rule_to_regions {
        let csv = regions.into_iter().collect::<Vec<_>>().join(",");
        by_region_csv.entry(csv).or_default().push(rule);
    }
    for rules in by_region_csv.values_mut() {
        rules.sort();
    }
    RegionRuleMap::Compressed(by_region_csv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_region_map_stays_uncompressed() {
        let map = HashMap::from([("us-east-1".to_string(), vec!["rule-a".to_string()])]);
        assert!(matches!(compress_region_rule_map(map), RegionRuleMap::PerRegion(_)));
    }

    #[test]
    fn rules_sharing_a_region_set_are_grouped_under_one_csv_key() {
        let map = HashMap::from([
            ("us-east-1".to_string(), vec!["rule-a".to_string(), "rule-b".to_string()]),
            ("eu-west-1".to_string(), vec!["rule-a".to_string(), "rule-b".to_string()]),
        ]);
        let compressed = compress_region_rule_map(map);
        match compressed {
            RegionRuleMap::Compressed(by_csv) => {
                assert_eq!(by_csv.len(), 1);
                let (csv, rules) = by_csv.into_iter().next().unwrap();
                assert_eq!(csv, "eu-west-1,us-east-1");
                assert_eq!(rules, vec!["rule-a".to_string(), "rule-b".to_string()]);
            }
            other => panic!("expected Compressed, got {other:?}"),
        }
    }

    #[test]
    fn rules_with_different_region_sets_stay_in_separate_keys() {
        let map = HashMap::from([
            ("us-east-1".to_string(), vec!["rule-a".to_string()]),
            ("eu-west-1".to_string(), vec!["rule-b".to_string()]),
        ]);
        let compressed = compress_region_rule_map(map);
        match compressed {
            RegionRuleMap::Compressed(by_csv) => assert_eq!(by_csv.len(), 2),
            other => panic!("expected Compressed, got {other:?}"),
        }
    }
}
