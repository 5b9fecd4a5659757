use rse_domain::Tenant;

use crate::error::AdmissionError;

/// Azure/GCP always scan at `global` scope; AWS/K8s intersect the request
/// against the tenant's active regions, rejecting any requested region the
/// tenant doesn't have active, and defaulting to every active region when
/// none are requested.
pub fn resolve_regions(tenant: &Tenant, requested: &[String]) -> Result<Vec<String>, AdmissionError> {
    if !tenant.cloud.is_region_addressable() {
        return Ok(vec![rse_domain::GLOBAL_REGION.to_string()]);
    }

    if requested.is_empty() {
        return Ok(tenant.active_regions.clone());
    }

    let unknown: Vec<String> =
        requested.iter().filter(|r| !tenant.has_region(r)).cloned().collect();
    if !unknown.is_empty() {
        return Err(AdmissionError::UnknownRegions(unknown));
    }
    Ok(requested.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rse_domain::{Cloud, CustomerName, TenantName};

    fn tenant(cloud: Cloud, regions: Vec<&str>) -> Tenant {
        Tenant {
            name: TenantName::new("T1"),
            customer: CustomerName::new("C1"),
            cloud,
            project: "acct-1".into(),
            active_regions: regions.into_iter().map(String::from).collect(),
            is_active: true,
        }
    }

    #[test]
    fn azure_always_resolves_to_global() {
        let t = tenant(Cloud::Azure, vec!["westus"]);
        assert_eq!(resolve_regions(&t, &["westus".into()]).unwrap(), vec!["global".to_string()]);
        assert_eq!(resolve_regions(&t, &[]).unwrap(), vec!["global".to_string()]);
    }

    #[test]
    fn aws_empty_request_resolves_to_all_active_regions() {
        let t = tenant(Cloud::Aws, vec!["us-east-1", "eu-west-1"]);
        let regions = resolve_regions(&t, &[]).unwrap();
        assert_eq!(regions, vec!["us-east-1".to_string(), "eu-west-1".to_string()]);
    }

    #[test]
    fn aws_rejects_regions_outside_active_set() {
        let t = tenant(Cloud::Aws, vec!["us-east-1"]);
        let err = resolve_regions(&t, &["ap-south-1".into()]).unwrap_err();
        assert!(matches!(err, AdmissionError::UnknownRegions(ref r) if r == &vec!["ap-south-1".to_string()]));
    }

    #[test]
    fn aws_intersects_requested_with_active() {
        let t = tenant(Cloud::Aws, vec!["us-east-1", "eu-west-1"]);
        let regions = resolve_regions(&t, &["us-east-1".into()]).unwrap();
        assert_eq!(regions, vec!["us-east-1".to_string()]);
    }
}
