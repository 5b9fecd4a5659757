use rse_domain::Cloud;
use serde_json::Value;

/// A single MAESTRO instance-management hit, stripped to the fields the
/// MAESTRO vendor processor keeps.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaestroHit {
    pub cloud: Cloud,
    pub tenant_name: String,
    /// `None` for Azure/GCP events, which carry no region (global scope).
    pub region: Option<String>,
    pub action: String,
}

/// Filters raw MAESTRO-vendor events to `group=MANAGEMENT, subGroup=INSTANCE,
/// cloud ∈ {AZURE, GOOGLE}` and strips the rest to `(eventAction, group,
/// subGroup, request.cloud, tenantName, regionName?)`. AWS-sourced MAESTRO
/// events are parsed by the data model but intentionally never routed
/// anywhere — deliberate, not a gap.
pub fn process(raw: &[Value]) -> Vec<MaestroHit> {
    raw.iter().filter_map(strip).collect()
}

fn strip(event: &Value) -> Option<MaestroHit> {
    if event.get("group")?.as_str()? != "MANAGEMENT" {
        return None;
    }
    if event.get("subGroup")?.as_str()? != "INSTANCE" {
        return None;
    }
    let request = event.get("request")?;
    let cloud = Cloud::parse(request.get("cloud")?.as_str()?)?;
    if !matches!(cloud, Cloud::Azure | Cloud::Google) {
        return None;
    }
    Some(MaestroHit {
        cloud,
        tenant_name: event.get("tenantName")?.as_str()?.to_string(),
        region: event.get("regionName").and_then(Value::as_str).map(str::to_string),
        action: event.get("eventAction")?.as_str()?.to_string(),
    })
}

/// Static `(subGroup=INSTANCE, action) -> CloudTrail-style (source,
/// eventName)` table: MAESTRO doesn't speak CloudTrail's vocabulary
/// natively, so its actions are translated into the same `(source,
/// eventName)` shape the AWS processor produces, letting both vendors share
/// one rule-mapping lookup.
const ACTION_TABLE: &[(&str, &str, &str)] = &[
    ("CREATE", "compute.instances", "InsertInstance"),
    ("DELETE", "compute.instances", "DeleteInstance"),
    ("START", "compute.instances", "StartInstance"),
    ("STOP", "compute.instances", "StopInstance"),
    ("RESIZE", "compute.instances", "SetMachineType"),
    ("UPDATE", "compute.instances", "UpdateInstance"),
];

pub fn to_cloudtrail_style(action: &str) -> Option<(&'static str, &'static str)> {
    ACTION_TABLE.iter().find(|(a, _, _)| *a == action).map(|(_, source, name)| (*source, *name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn instance_event(cloud: &str, action: &str) -> Value {
        json!({
            "group": "MANAGEMENT",
            "subGroup": "INSTANCE",
            "eventAction": action,
            "tenantName": "T1",
            "request": {"cloud": cloud},
        })
    }

    #[test]
    fn keeps_azure_and_google_instance_events() {
        let hits = process(&[instance_event("AZURE", "CREATE"), instance_event("GOOGLE", "DELETE")]);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn drops_aws_maestro_events_per_open_question() {
        assert!(process(&[instance_event("AWS", "CREATE")]).is_empty());
    }

    #[test]
    fn drops_events_outside_management_instance_scope() {
        let event = json!({"group": "SECURITY", "subGroup": "INSTANCE", "request": {"cloud": "AZURE"}});
        assert!(process(&[event]).is_empty());
    }

    #[test]
    fn action_table_resolves_known_actions_only() {
        assert_eq!(to_cloudtrail_style("CREATE"), Some(("compute.instances", "InsertInstance")));
        assert_eq!(to_cloudtrail_style("BOGUS"), None);
    }
}
