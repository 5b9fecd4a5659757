use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::{ResourceExceptionId, TenantName};

/// Exactly one identification mode is populated for a given exception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExceptionIdentity {
    Arn { arn: String },
    ResourceLocation { resource_id: String, location: String, resource_type: Option<String> },
    Tags { tags_filters: HashMap<String, String> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceException {
    pub id: ResourceExceptionId,
    pub tenant: Option<TenantName>,
    pub customer: String,
    pub identity: ExceptionIdentity,
    pub expire_at: chrono::DateTime<chrono::Utc>,
}

impl ResourceException {
    pub fn is_expired(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        now > self.expire_at
    }
}
