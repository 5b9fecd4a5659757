use serde_json::Value;

/// A single CloudTrail-via-EventBridge hit, stripped to the fields the AWS
/// vendor processor keeps.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AwsHit {
    pub account_id: String,
    pub region: String,
    pub event_source: String,
    pub event_name: String,
}

/// Filters raw AWS-vendor events to `AWS API Call via CloudTrail` records,
/// drops self-account events, and strips the rest to `(eventName,
/// eventSource, accountId, awsRegion)`. Records missing any of the fields
/// this processor needs are silently dropped — they were never going to
/// resolve to a rule anyway.
pub fn process(raw: &[Value], self_account_id: Option<&str>) -> Vec<AwsHit> {
    raw.iter().filter_map(|event| strip(event, self_account_id)).collect()
}

fn strip(event: &Value, self_account_id: Option<&str>) -> Option<AwsHit> {
    if event.get("detail-type")?.as_str()? != "AWS API Call via CloudTrail" {
        return None;
    }
    let detail = event.get("detail")?;
    let account_id = detail.get("userIdentity")?.get("accountId")?.as_str()?.to_string();
    if self_account_id.is_some_and(|id| id == account_id) {
        return None;
    }
    Some(AwsHit {
        account_id,
        region: detail.get("awsRegion")?.as_str()?.to_string(),
        event_source: detail.get("eventSource")?.as_str()?.to_string(),
        event_name: detail.get("eventName")?.as_str()?.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cloudtrail_event(account: &str) -> Value {
        json!({
            "detail-type": "AWS API Call via CloudTrail",
            "detail": {
                "eventName": "DeleteBucket",
                "eventSource": "s3.amazonaws.com",
                "awsRegion": "us-east-1",
                "userIdentity": {"accountId": account},
            }
        })
    }

    #[test]
    fn keeps_cloudtrail_events_and_strips_fields() {
        let hits = process(&[cloudtrail_event("111111111111")], None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].event_name, "DeleteBucket");
        assert_eq!(hits[0].event_source, "s3.amazonaws.com");
        assert_eq!(hits[0].region, "us-east-1");
    }

    #[test]
    fn drops_non_cloudtrail_detail_types() {
        let event = json!({"detail-type": "Scheduled Event", "detail": {}});
        assert!(process(&[event], None).is_empty());
    }

    #[test]
    fn drops_self_account_events() {
        let hits = process(&[cloudtrail_event("999999999999")], Some("999999999999"));
        assert!(hits.is_empty());
    }
}
