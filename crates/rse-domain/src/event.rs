use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventVendor {
    Aws,
    Maestro,
}

/// A raw audit-event partition record. `partition` is assigned randomly at
/// creation so writes spread evenly across the N partitions the event
/// assembler reads from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub partition: u32,
    pub timestamp: f64,
    pub vendor: EventVendor,
    pub events: Vec<serde_json::Value>,
    pub ttl: Option<chrono::DateTime<chrono::Utc>>,
}
