use rse_domain::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("tenant not found: {0}")]
    TenantNotFound(String),

    #[error("tenant '{0}' is not accessible to the caller")]
    TenantNotAllowed(String),

    #[error("unknown region(s) requested: {0:?}")]
    UnknownRegions(Vec<String>),

    #[error("job lock held by job {holder} conflicts with this request")]
    LockConflict { holder: String },

    #[error("no rulesets or licenses supplied")]
    NoRulesetsOrLicenses,

    #[error("ambiguous situation. Multiple licenses: {0}")]
    AmbiguousLicense(String),

    #[error("ruleset not found: {0}")]
    RulesetNotFound(String),

    #[error("unresolved rule(s) in rules_to_scan: {0:?}")]
    UnresolvedRulesToScan(Vec<String>),

    #[error("license manager denied permission for tenant license key {0}")]
    PermissionDenied(String),

    #[error("job '{0}' is already in a terminal state")]
    AlreadyTerminal(String),

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("supplied credentials resolve to cloud identifier '{resolved}', expected '{expected}'")]
    CredentialsMismatch { resolved: String, expected: String },

    #[error(transparent)]
    Licensing(#[from] rse_licensing::LicensingError),

    #[error(transparent)]
    Ruleset(#[from] rse_rulesets::RulesetError),

    #[error(transparent)]
    Store(#[from] rse_store::StoreError),

    #[error("executor submission failed: {0}")]
    Executor(String),
}

impl AdmissionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdmissionError::TenantNotFound(_)
            | AdmissionError::RulesetNotFound(_)
            | AdmissionError::JobNotFound(_) => ErrorKind::NotFound,
            AdmissionError::TenantNotAllowed(_)
            | AdmissionError::LockConflict { .. }
            | AdmissionError::PermissionDenied(_) => ErrorKind::Forbidden,
            AdmissionError::UnknownRegions(_)
            | AdmissionError::NoRulesetsOrLicenses
            | AdmissionError::UnresolvedRulesToScan(_)
            | AdmissionError::CredentialsMismatch { .. } => ErrorKind::BadRequest,
            AdmissionError::AmbiguousLicense(_) | AdmissionError::AlreadyTerminal(_) => {
                ErrorKind::Conflict
            }
            AdmissionError::Licensing(e) => e.kind(),
            AdmissionError::Ruleset(e) => e.kind(),
            AdmissionError::Store(_) => ErrorKind::InternalError,
            AdmissionError::Executor(_) => ErrorKind::ServiceUnavailable,
        }
    }
}
