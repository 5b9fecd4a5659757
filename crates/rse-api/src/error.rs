use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rse_domain::ErrorKind;
use serde_json::json;

/// Uniform API error: every crate-local error converts into one of these
/// via its `ErrorKind` status mapping, so the boundary never needs to know
/// which component raised it.
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError { status: StatusCode::BAD_REQUEST, message: msg.into() }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError { status: StatusCode::NOT_FOUND, message: msg.into() }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<rse_store::StoreError> for ApiError {
    fn from(e: rse_store::StoreError) -> Self {
        let status = match &e {
            rse_store::StoreError::LockConflict { .. } => StatusCode::FORBIDDEN,
            rse_store::StoreError::Duplicate(_) => StatusCode::CONFLICT,
            rse_store::StoreError::TenantNotFound(_)
            | rse_store::StoreError::RulesetNotFound(_)
            | rse_store::StoreError::JobNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError { status, message: e.to_string() }
    }
}

impl From<rse_admission::AdmissionError> for ApiError {
    fn from(e: rse_admission::AdmissionError) -> Self {
        ApiError { status: status_for(e.kind()), message: e.to_string() }
    }
}

impl From<rse_rulesets::RulesetError> for ApiError {
    fn from(e: rse_rulesets::RulesetError) -> Self {
        ApiError { status: status_for(e.kind()), message: e.to_string() }
    }
}

impl From<rse_scheduled_jobs::ScheduledJobError> for ApiError {
    fn from(e: rse_scheduled_jobs::ScheduledJobError) -> Self {
        ApiError { status: status_for(e.kind()), message: e.to_string() }
    }
}
