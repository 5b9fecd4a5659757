use rse_domain::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LicensingError {
    #[error("no license is applicable to tenant '{0}'")]
    NoApplicableLicense(String),

    #[error("license '{0}' is not applicable to tenant '{1}'")]
    NotApplicable(String, String),

    #[error("license '{0}' is expired")]
    Expired(String),

    #[error("license '{0}' is not enabled for event-driven use")]
    EventDrivenDisabled(String),

    #[error("ambiguous situation. Multiple licenses: {0}")]
    Ambiguous(String),

    #[error(transparent)]
    Store(#[from] rse_store::StoreError),
}

impl LicensingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LicensingError::NoApplicableLicense(_)
            | LicensingError::NotApplicable(..)
            | LicensingError::Expired(_)
            | LicensingError::EventDrivenDisabled(_) => ErrorKind::Forbidden,
            LicensingError::Ambiguous(_) => ErrorKind::Conflict,
            LicensingError::Store(_) => ErrorKind::InternalError,
        }
    }
}
