//! Resource exceptions filter: intersects a
//! [`rse_shards::ShardsCollection`] against a tenant's exception set.

mod collection;
mod error;
mod filter;

pub use collection::ExceptionCollection;
pub use error::ExceptionsError;
pub use filter::{filter, ExceptionSummary, RuleSummaryMeta};
