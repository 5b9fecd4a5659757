pub mod jobs;
pub mod rulesets;
pub mod scheduled_jobs;

use axum::http::StatusCode;

pub async fn health() -> StatusCode {
    StatusCode::OK
}
