//! Event mapping collector: builds per-cloud
//! `source -> eventName -> []ruleName` mappings from rule metadata and
//! publishes/reads them from the blob store.

mod collector;
mod error;
mod io;
mod provider;

pub use collector::{build_mappings, EventMapping};
pub use error::EventMappingError;
pub use io::EventMappingBlobIo;
pub use provider::{publish, S3EventMappingProvider, EVENT_MAPPING_CLOUDS, LATEST_MAPPING_VERSION};
