use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use rse_domain::{ExceptionIdentity, ResourceException, ResourceExceptionId};
use serde_json::Value;

/// Prefix-tree over sorted `"key=value"` tag tokens. Each leaf carries the
/// exception id for the root-to-leaf token path that led to it.
#[derive(Debug, Default)]
struct TagNode {
    children: BTreeMap<String, TagNode>,
    leaf: Option<ResourceExceptionId>,
}

impl TagNode {
    fn insert(&mut self, tokens: &[String], id: ResourceExceptionId) {
        match tokens.split_first() {
            None => self.leaf = Some(id),
            Some((first, rest)) => self.children.entry(first.clone()).or_default().insert(rest, id),
        }
    }

    /// A tag tree matches when the resource's tag set contains every tag on
    /// any root-to-leaf path: descend only through children whose token is
    /// present in `tags`, and report the first leaf reached.
    fn find_match(&self, tags: &HashSet<String>) -> Option<ResourceExceptionId> {
        if let Some(id) = &self.leaf {
            return Some(id.clone());
        }
        for (token, child) in &self.children {
            if tags.contains(token) {
                if let Some(id) = child.find_match(tags) {
                    return Some(id);
                }
            }
        }
        None
    }
}

/// ARN map, (id, type, location) map, and tag prefix-tree over a tenant's
/// non-expired exceptions.
#[derive(Debug, Default)]
pub struct ExceptionCollection {
    by_arn: HashMap<String, ResourceExceptionId>,
    by_resource: HashMap<(String, String, Option<String>), ResourceExceptionId>,
    tag_tree: TagNode,
}

impl ExceptionCollection {
    pub fn build(exceptions: &[ResourceException], now: DateTime<Utc>) -> Self {
        let mut collection = Self::default();
        for exc in exceptions {
            if exc.is_expired(now) {
                continue;
            }
            match &exc.identity {
                ExceptionIdentity::Arn { arn } => {
                    collection.by_arn.insert(arn.clone(), exc.id.clone());
                }
                ExceptionIdentity::ResourceLocation { resource_id, location, resource_type } => {
                    collection.by_resource.insert(
                        (resource_id.clone(), location.clone(), resource_type.clone()),
                        exc.id.clone(),
                    );
                }
                ExceptionIdentity::Tags { tags_filters } => {
                    let mut tokens: Vec<String> =
                        tags_filters.iter().map(|(k, v)| format!("{k}={v}")).collect();
                    tokens.sort();
                    collection.tag_tree.insert(&tokens, exc.id.clone());
                }
            }
        }
        collection
    }

    /// Check order: by-ARN, by-(id,type,location), by-tags.
    pub fn match_resource(&self, resource: &Value) -> Option<ResourceExceptionId> {
        if let Some(arn) = resource.get("arn").and_then(Value::as_str) {
            if let Some(id) = self.by_arn.get(arn) {
                return Some(id.clone());
            }
        }

        let resource_id = resource.get("id").and_then(Value::as_str);
        let location = resource
            .get("location")
            .or_else(|| resource.get("region"))
            .and_then(Value::as_str);
        if let (Some(rid), Some(loc)) = (resource_id, location) {
            let resource_type = resource
                .get("resourceType")
                .or_else(|| resource.get("type"))
                .and_then(Value::as_str)
                .map(String::from);
            let key_typed = (rid.to_string(), loc.to_string(), resource_type.clone());
            if let Some(id) = self.by_resource.get(&key_typed) {
                return Some(id.clone());
            }
            if resource_type.is_some() {
                let key_wildcard = (rid.to_string(), loc.to_string(), None);
                if let Some(id) = self.by_resource.get(&key_wildcard) {
                    return Some(id.clone());
                }
            }
        }

        let tags = extract_tag_tokens(resource);
        self.tag_tree.find_match(&tags)
    }
}

fn extract_tag_tokens(resource: &Value) -> HashSet<String> {
    let mut tokens = HashSet::new();
    if let Some(tags) = resource.get("tags").and_then(Value::as_object) {
        for (k, v) in tags {
            if let Some(vs) = v.as_str() {
                tokens.insert(format!("{k}={vs}"));
            }
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap as Map;

    fn far_future() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(9999, 1, 1, 0, 0, 0).unwrap()
    }

    fn exc(id: &str, identity: ExceptionIdentity) -> ResourceException {
        ResourceException {
            id: ResourceExceptionId::new(id),
            tenant: None,
            customer: "C1".into(),
            identity,
            expire_at: far_future(),
        }
    }

    #[test]
    fn matches_by_arn_first() {
        let excs = vec![exc("E1", ExceptionIdentity::Arn { arn: "arn:aws:s3:::bucket".into() })];
        let collection = ExceptionCollection::build(&excs, Utc::now());
        let resource = serde_json::json!({"arn": "arn:aws:s3:::bucket", "id": "bucket"});
        assert_eq!(collection.match_resource(&resource), Some(ResourceExceptionId::new("E1")));
    }

    #[test]
    fn matches_by_resource_id_type_location() {
        let excs = vec![exc(
            "E1",
            ExceptionIdentity::ResourceLocation {
                resource_id: "i-123".into(),
                location: "us-east-1".into(),
                resource_type: Some("aws.ec2".into()),
            },
        )];
        let collection = ExceptionCollection::build(&excs, Utc::now());
        let resource =
            serde_json::json!({"id": "i-123", "location": "us-east-1", "type": "aws.ec2"});
        assert_eq!(collection.match_resource(&resource), Some(ResourceExceptionId::new("E1")));
    }

    #[test]
    fn tag_filter_matches_when_all_listed_tags_present() {
        let mut tags_filters = Map::new();
        tags_filters.insert("env".to_string(), "prod".to_string());
        tags_filters.insert("team".to_string(), "platform".to_string());
        let excs = vec![exc("E1", ExceptionIdentity::Tags { tags_filters })];
        let collection = ExceptionCollection::build(&excs, Utc::now());

        let full_match =
            serde_json::json!({"id": "x", "tags": {"env": "prod", "team": "platform", "extra": "1"}});
        assert_eq!(collection.match_resource(&full_match), Some(ResourceExceptionId::new("E1")));

        let partial = serde_json::json!({"id": "x", "tags": {"env": "prod"}});
        assert_eq!(collection.match_resource(&partial), None);
    }

    #[test]
    fn expired_exceptions_are_excluded_from_the_collection() {
        let mut e = exc("E1", ExceptionIdentity::Arn { arn: "arn:x".into() });
        e.expire_at = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let collection = ExceptionCollection::build(&[e], Utc::now());
        let resource = serde_json::json!({"arn": "arn:x"});
        assert_eq!(collection.match_resource(&resource), None);
    }
}
