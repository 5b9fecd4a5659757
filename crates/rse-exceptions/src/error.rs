use rse_domain::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExceptionsError {
    #[error("exception '{0}' has no identification mode populated")]
    NoIdentity(String),
}

impl ExceptionsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExceptionsError::NoIdentity(_) => ErrorKind::InternalError,
        }
    }
}
