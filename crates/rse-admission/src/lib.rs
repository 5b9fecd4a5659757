//! Job Admission & Dispatch: precondition pipeline, region and ruleset
//! resolution, executor submission/termination, and the tenant job lock.

mod env;
mod error;
mod executor;
mod license_manager;
mod region;
mod ruleset_resolution;
mod secret;
mod service;

pub use env::{build_event_driven_env, build_job_env, ExecutorJobType};
pub use error::AdmissionError;
pub use executor::{Executor, ExecutorRegistry, InMemoryExecutor};
pub use license_manager::{AllowAllLicenseManagerClient, HttpLicenseManagerClient, LicenseManagerClient};
pub use region::resolve_regions;
pub use ruleset_resolution::{resolve_rules_to_scan, resolve_rulesets, ResolvedRulesets, RulesetNameInput};
pub use secret::{InMemorySecretStore, SecretStore, CREDENTIALS_TTL_SECONDS};
pub use service::{AdmissionService, CredentialsPayload, SubmitJobRequest};
