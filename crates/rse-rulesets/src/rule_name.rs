use std::collections::HashMap;

const KNOWN_CLOUDS: &[&str] = &["aws", "azure", "gcp", "k8s"];

/// A rule id's up-to-four hyphen-separated tokens: `vendor-cloud-number-humanName`.
/// `cloud` is only recognized when the second token is a known cloud tag;
/// everything after the first two tokens is optional but must appear in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRuleName {
    pub vendor: Option<String>,
    pub cloud: Option<String>,
    pub number: Option<String>,
    pub human_name: Option<String>,
}

impl ParsedRuleName {
    pub fn parse(id: &str) -> Self {
        let mut tokens = id.splitn(4, '-');
        let vendor = tokens.next().filter(|s| !s.is_empty()).map(String::from);
        let Some(second) = tokens.next() else {
            return ParsedRuleName { vendor, ..Default::default() };
        };
        if !KNOWN_CLOUDS.contains(&second) {
            // second token isn't a recognized cloud: treat it as the human
            // name tail, cloud/number stay unresolved.
            let rest = tokens.collect::<Vec<_>>().join("-");
            let human_name =
                if rest.is_empty() { Some(second.to_string()) } else { Some(format!("{second}-{rest}")) };
            return ParsedRuleName { vendor, cloud: None, number: None, human_name };
        }
        let cloud = Some(second.to_string());
        let number = tokens.next().map(String::from);
        let human_name = tokens.next().map(String::from);
        ParsedRuleName { vendor, cloud, number, human_name }
    }
}

/// `find all rule ids containing the fragment` per-input result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FuzzyResolution {
    pub resolved: HashMap<String, Vec<String>>,
    pub unresolved: Vec<String>,
}

/// For each `fragment` in `fragments`, find every id in `rule_ids` containing
/// it as a substring. `allow_multiple` yields every match per fragment;
/// `allow_ambiguous` yields only the first match even when there's more than
/// one. With both false, a fragment with more than one match is reported
/// unresolved rather than silently collapsed.
pub fn fuzzy_match(
    rule_ids: &[String],
    fragments: &[String],
    allow_multiple: bool,
    allow_ambiguous: bool,
) -> FuzzyResolution {
    let mut result = FuzzyResolution::default();
    for fragment in fragments {
        let matches: Vec<String> =
            rule_ids.iter().filter(|id| id.contains(fragment.as_str())).cloned().collect();
        match matches.len() {
            0 => result.unresolved.push(fragment.clone()),
            1 => {
                result.resolved.insert(fragment.clone(), matches);
            }
            _ => {
                if allow_multiple {
                    result.resolved.insert(fragment.clone(), matches);
                } else if allow_ambiguous {
                    result.resolved.insert(fragment.clone(), vec![matches[0].clone()]);
                } else {
                    result.unresolved.push(fragment.clone());
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_four_tokens() {
        let parsed = ParsedRuleName::parse("ecc-aws-042-open-s3-bucket");
        assert_eq!(parsed.vendor, Some("ecc".into()));
        assert_eq!(parsed.cloud, Some("aws".into()));
        assert_eq!(parsed.number, Some("042".into()));
        assert_eq!(parsed.human_name, Some("open-s3-bucket".into()));
    }

    #[test]
    fn unrecognized_second_token_is_not_a_cloud() {
        let parsed = ParsedRuleName::parse("ecc-custom-rule-name");
        assert_eq!(parsed.vendor, Some("ecc".into()));
        assert_eq!(parsed.cloud, None);
        assert_eq!(parsed.number, None);
        assert_eq!(parsed.human_name, Some("custom-rule-name".into()));
    }

    #[test]
    fn fuzzy_match_reports_unique_match() {
        let ids = vec!["ecc-aws-001-x".to_string(), "ecc-aws-002-y".to_string()];
        let fragments = vec!["001".to_string()];
        let result = fuzzy_match(&ids, &fragments, false, false);
        assert_eq!(result.resolved.get("001"), Some(&vec!["ecc-aws-001-x".to_string()]));
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn fuzzy_match_reports_unresolved_on_ambiguity_when_both_flags_false() {
        let ids = vec!["ecc-aws-001-x".to_string(), "ecc-aws-001-y".to_string()];
        let fragments = vec!["001".to_string()];
        let result = fuzzy_match(&ids, &fragments, false, false);
        assert!(result.resolved.is_empty());
        assert_eq!(result.unresolved, vec!["001".to_string()]);
    }

    #[test]
    fn fuzzy_match_allow_multiple_yields_every_match() {
        let ids = vec!["ecc-aws-001-x".to_string(), "ecc-aws-001-y".to_string()];
        let fragments = vec!["001".to_string()];
        let result = fuzzy_match(&ids, &fragments, true, false);
        assert_eq!(result.resolved.get("001").unwrap().len(), 2);
    }

    #[test]
    fn fuzzy_match_allow_ambiguous_yields_first_match_only() {
        let ids = vec!["ecc-aws-001-x".to_string(), "ecc-aws-001-y".to_string()];
        let fragments = vec!["001".to_string()];
        let result = fuzzy_match(&ids, &fragments, false, true);
        assert_eq!(result.resolved.get("001"), Some(&vec!["ecc-aws-001-x".to_string()]));
    }
}
