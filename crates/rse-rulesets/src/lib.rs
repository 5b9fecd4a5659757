//! Ruleset composition & versioning, and rule name resolution.

mod bundle_io;
mod content_hash;
mod error;
mod rule_name;
mod service;

pub use bundle_io::RulesetBundleIo;
pub use content_hash::compute_bundle_hash;
pub use error::RulesetError;
pub use rule_name::{fuzzy_match, FuzzyResolution, ParsedRuleName};
pub use service::{
    CreateRulesetRequest, ReleaseOutcome, ReleaseResult, RulesetService, UpdateRulesetRequest,
};
