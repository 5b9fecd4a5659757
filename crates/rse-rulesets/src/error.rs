use rse_domain::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulesetError {
    #[error("cannot resolve version for ruleset '{0}'")]
    UnresolvableVersion(String),

    #[error("ruleset version already exists: {0}")]
    VersionConflict(String),

    #[error("cloud mismatch: existing ruleset '{0}' is {1}")]
    CloudMismatch(String, String),

    #[error("no rules matched the requested selection")]
    EmptySelection,

    #[error("ruleset content unchanged; pass force to update anyway")]
    NoOpUpdate,

    #[error("ruleset not found: {0}")]
    NotFound(String),

    #[error("unresolved rule fragment(s): {0:?}")]
    UnresolvedFragments(Vec<String>),

    #[error(transparent)]
    Store(#[from] rse_store::StoreError),

    #[error("blob store error: {0}")]
    Blob(String),

    #[error("license manager request failed: {0}")]
    LicenseManager(String),
}

impl RulesetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RulesetError::UnresolvableVersion(_)
            | RulesetError::CloudMismatch(..)
            | RulesetError::EmptySelection
            | RulesetError::UnresolvedFragments(_) => ErrorKind::BadRequest,
            RulesetError::VersionConflict(_) | RulesetError::NoOpUpdate => ErrorKind::Conflict,
            RulesetError::NotFound(_) => ErrorKind::NotFound,
            RulesetError::Store(_) | RulesetError::Blob(_) => ErrorKind::InternalError,
            RulesetError::LicenseManager(_) => ErrorKind::ServiceUnavailable,
        }
    }
}
