use rse_domain::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventMappingError {
    #[error("event mapping blob store error: {0}")]
    Blob(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EventMappingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EventMappingError::Blob(_) => ErrorKind::ServiceUnavailable,
            EventMappingError::Serialization(_) => ErrorKind::InternalError,
        }
    }
}
