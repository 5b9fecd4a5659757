use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CustomerName, LicenseKey, RulesetId, TenantLicenseKey};
use crate::tenant::TenantName;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CustomerScope {
    pub tenant_license_key: TenantLicenseKey,
    /// Empty scope means "all tenants of this customer".
    pub tenants: Vec<TenantName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventDriven {
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub license_key: LicenseKey,
    pub customers: HashMap<CustomerName, CustomerScope>,
    pub ruleset_ids: HashSet<RulesetId>,
    pub event_driven: EventDriven,
    pub expiration: DateTime<Utc>,
}

impl License {
    /// A license is applicable to `(customer, tenant)` iff it has an entry
    /// for that customer AND its per-customer scope includes the tenant
    /// (an empty scope means all tenants of that customer).
    pub fn is_applicable(&self, customer: &CustomerName, tenant: &TenantName) -> bool {
        match self.customers.get(customer) {
            Some(scope) => scope.tenants.is_empty() || scope.tenants.iter().any(|t| t == tenant),
            None => false,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiration
    }

    pub fn is_event_driven_active(&self) -> bool {
        self.event_driven.active
    }

    pub fn tenant_license_key(&self, customer: &CustomerName) -> Option<&TenantLicenseKey> {
        self.customers.get(customer).map(|s| &s.tenant_license_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn license(tenants: Vec<&str>) -> License {
        License {
            license_key: LicenseKey::new("L1"),
            customers: HashMap::from([(
                CustomerName::new("C1"),
                CustomerScope {
                    tenant_license_key: TenantLicenseKey::new("tlk-1"),
                    tenants: tenants.into_iter().map(TenantName::new).collect(),
                },
            )]),
            ruleset_ids: HashSet::from([RulesetId::new("RS-AWS-CORE")]),
            event_driven: EventDriven { active: true },
            expiration: Utc.with_ymd_and_hms(9999, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn empty_scope_means_all_tenants_of_customer() {
        let l = license(vec![]);
        assert!(l.is_applicable(&CustomerName::new("C1"), &TenantName::new("anything")));
    }

    #[test]
    fn non_empty_scope_restricts_to_named_tenants() {
        let l = license(vec!["T1"]);
        assert!(l.is_applicable(&CustomerName::new("C1"), &TenantName::new("T1")));
        assert!(!l.is_applicable(&CustomerName::new("C1"), &TenantName::new("T2")));
    }

    #[test]
    fn missing_customer_entry_is_not_applicable() {
        let l = license(vec!["T1"]);
        assert!(!l.is_applicable(&CustomerName::new("OTHER"), &TenantName::new("T1")));
    }

    #[test]
    fn expiration_is_strictly_after_now() {
        let mut l = license(vec![]);
        l.expiration = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        assert!(l.is_expired(Utc::now()));
    }
}
