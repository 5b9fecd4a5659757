use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("tenant not found: {0}")]
    TenantNotFound(String),

    #[error("ruleset not found: {0}")]
    RulesetNotFound(String),

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal store error: {0}")]
    Internal(String),

    /// Returned when the tenant job lock is already held.
    #[error("job lock conflict: already held by job {holder}")]
    LockConflict { holder: String },

    /// `(customer, name)` uniqueness violation for a `ScheduledJob`, or
    /// `(customer, name, version)` for a `Ruleset`.
    #[error("duplicate key: {0}")]
    Duplicate(String),
}
