use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! newtype_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

newtype_id!(TenantName);
newtype_id!(CustomerName);
newtype_id!(LicenseKey);
newtype_id!(TenantLicenseKey);
newtype_id!(RulesetId);
newtype_id!(RuleSourceId);
newtype_id!(JobId);
newtype_id!(BatchResultsId);
newtype_id!(ScheduledJobName);
newtype_id!(ResourceExceptionId);

pub const SYSTEM_CUSTOMER: &str = "SYSTEM";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trips_through_json() {
        let id = JobId::new("job-123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"job-123\"");
        let back: JobId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn id_displays_as_inner_string() {
        assert_eq!(TenantName::new("T1").to_string(), "T1");
    }
}
