//! Entities for the rule engine control plane: Tenant, License,
//! Ruleset, Rule, RuleSource, Job, BatchResults, Event, ScheduledJob,
//! ResourceException, plus the shared newtype ids and error vocabulary every
//! other crate builds on.
//!
//! Ownership & lifecycle: a Job is owned by exactly one Tenant,
//! created once by the admission handler and mutated only by the admission
//! handler (executor id), the terminate handler (FAILED + reason), or an
//! out-of-band status reconciler (RUNNING/SUCCEEDED/FAILED); destroyed by
//! TTL. A License is owned by the external License Manager; this crate only
//! models the cached replica.

pub mod batch_results;
pub mod error;
pub mod event;
pub mod exception;
pub mod ids;
pub mod job;
pub mod license;
pub mod rule;
pub mod rule_source;
pub mod ruleset;
pub mod scheduled_job;
pub mod tenant;

pub use batch_results::{BatchResults, EventDrivenBatchType, RegionRuleMap};
pub use error::{DomainError, ErrorKind, PolicyErrorKind};
pub use event::{Event, EventVendor};
pub use exception::{ExceptionIdentity, ResourceException};
pub use ids::{
    BatchResultsId, CustomerName, JobId, LicenseKey, ResourceExceptionId, RuleSourceId, RulesetId,
    ScheduledJobName, TenantLicenseKey, TenantName, SYSTEM_CUSTOMER,
};
pub use job::{Job, JobStatus, RulesetName};
pub use license::{CustomerScope, EventDriven, License};
pub use rule::{MitreTactic, Rule, RuleCommentMeta, RuleLocation, RuleMetaEvent, Severity};
pub use rule_source::{LatestSync, RuleSource, RuleSourceType, SyncStatus};
pub use ruleset::{Ruleset, RulesetVersion, S3Path};
pub use scheduled_job::{ScheduledJob, ScheduledJobMeta, ScheduledJobType};
pub use tenant::{Cloud, Tenant, GLOBAL_REGION};
