use thiserror::Error;

/// HTTP-status-tagged error kind, per the control plane's error table.
///
/// Every crate-local error type converts into one of these so the API
/// boundary can render a uniform response without knowing which component
/// raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Forbidden,
    NotFound,
    Conflict,
    MultiStatus,
    ServiceUnavailable,
    InternalError,
    NotImplemented,
}

impl ErrorKind {
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::MultiStatus => 207,
            ErrorKind::ServiceUnavailable => 503,
            ErrorKind::InternalError => 500,
            ErrorKind::NotImplemented => 501,
        }
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid tenant name: {0}")]
    InvalidTenantName(String),
    #[error("invalid rule name '{0}': {1}")]
    InvalidRuleName(String, String),
    #[error("invalid ruleset version '{0}': {1}")]
    InvalidVersion(String, String),
    #[error("unknown cloud '{0}'")]
    UnknownCloud(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::BadRequest
    }
}

/// Classified kind of a `ShardPart.error` string, tagged `"kind:message"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyErrorKind {
    Access,
    Credentials,
    Client,
    Skipped,
    Internal,
}

impl PolicyErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyErrorKind::Access => "ACCESS",
            PolicyErrorKind::Credentials => "CREDENTIALS",
            PolicyErrorKind::Client => "CLIENT",
            PolicyErrorKind::Skipped => "SKIPPED",
            PolicyErrorKind::Internal => "INTERNAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACCESS" => Some(PolicyErrorKind::Access),
            "CREDENTIALS" => Some(PolicyErrorKind::Credentials),
            "CLIENT" => Some(PolicyErrorKind::Client),
            "SKIPPED" => Some(PolicyErrorKind::Skipped),
            "INTERNAL" => Some(PolicyErrorKind::Internal),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_maps_to_spec_status_codes() {
        assert_eq!(ErrorKind::BadRequest.status_code(), 400);
        assert_eq!(ErrorKind::Conflict.status_code(), 409);
        assert_eq!(ErrorKind::MultiStatus.status_code(), 207);
        assert_eq!(ErrorKind::NotImplemented.status_code(), 501);
    }

    #[test]
    fn policy_error_kind_parses_known_prefixes() {
        assert_eq!(PolicyErrorKind::parse("ACCESS"), Some(PolicyErrorKind::Access));
        assert_eq!(PolicyErrorKind::parse("bogus"), None);
    }
}
