//! Event Assembler: cursor-driven, N-partition, ordered audit-event
//! ingestion, per-vendor rule resolution against the published event
//! mapping, and per-tenant `BatchResults` assembly into a single
//! multi-tenant batch job submission.

mod aws;
mod compress;
mod dedup;
mod error;
mod maestro;
mod merge;
mod pipeline;

pub use aws::AwsHit;
pub use compress::compress_region_rule_map;
pub use dedup::dedup_stream;
pub use error::EventAssemblerError;
pub use maestro::MaestroHit;
pub use merge::k_way_merge;
pub use pipeline::{AssemblerRun, EventAssembler, PAGE_SIZE};
