use rse_domain::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduledJobError {
    #[error("tenant not found: {0}")]
    TenantNotFound(String),

    #[error("scheduled job not found: {customer}/{name}")]
    NotFound { customer: String, name: String },

    #[error("scheduled job already exists: {customer}/{name}")]
    Duplicate { customer: String, name: String },

    #[error("scheduler unavailable in this deployment mode")]
    SchedulerUnavailable,

    #[error("invalid cron schedule '{0}': {1}")]
    InvalidSchedule(String, String),

    #[error(transparent)]
    Admission(#[from] rse_admission::AdmissionError),

    #[error(transparent)]
    Store(#[from] rse_store::StoreError),
}

impl ScheduledJobError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScheduledJobError::TenantNotFound(_) | ScheduledJobError::NotFound { .. } => {
                ErrorKind::NotFound
            }
            ScheduledJobError::Duplicate { .. } => ErrorKind::Conflict,
            ScheduledJobError::SchedulerUnavailable => ErrorKind::NotImplemented,
            ScheduledJobError::InvalidSchedule(..) => ErrorKind::BadRequest,
            ScheduledJobError::Admission(e) => e.kind(),
            ScheduledJobError::Store(_) => ErrorKind::InternalError,
        }
    }
}
