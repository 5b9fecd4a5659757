use rse_domain::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventAssemblerError {
    #[error("no new events since cursor")]
    NoNewEvents,

    #[error(transparent)]
    Store(#[from] rse_store::StoreError),

    #[error(transparent)]
    EventMapping(#[from] rse_event_mapping::EventMappingError),

    #[error(transparent)]
    Licensing(#[from] rse_licensing::LicensingError),

    #[error("executor submission failed: {0}")]
    Executor(String),
}

impl EventAssemblerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EventAssemblerError::NoNewEvents => ErrorKind::NotFound,
            EventAssemblerError::Store(_) => ErrorKind::InternalError,
            EventAssemblerError::EventMapping(e) => e.kind(),
            EventAssemblerError::Licensing(e) => e.kind(),
            EventAssemblerError::Executor(_) => ErrorKind::ServiceUnavailable,
        }
    }
}

impl From<rse_admission::AdmissionError> for EventAssemblerError {
    fn from(e: rse_admission::AdmissionError) -> Self {
        EventAssemblerError::Executor(e.to_string())
    }
}
