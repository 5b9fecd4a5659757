use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Thin axum boundary over the admission/ruleset/scheduled-job services.
/// Request validation and full routing concerns live upstream of this
/// crate — handlers stay pass-throughs onto the services that hold the
/// actual logic.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/jobs", post(handlers::jobs::submit_job))
        .route("/jobs/:id", delete(handlers::jobs::terminate_job))
        .route("/rulesets", post(handlers::rulesets::create_ruleset))
        .route("/rulesets/:customer/:name", patch(handlers::rulesets::update_ruleset))
        .route("/rulesets/release", post(handlers::rulesets::release_rulesets))
        .route("/scheduled-jobs", post(handlers::scheduled_jobs::register_scheduled_job))
        .route("/scheduled-jobs/:tenant", get(handlers::scheduled_jobs::list_scheduled_jobs))
        .route(
            "/scheduled-jobs/:customer/:name",
            get(handlers::scheduled_jobs::get_scheduled_job)
                .patch(handlers::scheduled_jobs::update_scheduled_job)
                .delete(handlers::scheduled_jobs::delete_scheduled_job),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn test_state() -> AppState {
        let store: Arc<dyn rse_store::Store> = Arc::new(rse_store::InMemoryStore::new());
        let license_view = Arc::new(rse_licensing::LicenseView::new(store.clone()));
        let mut executors = rse_admission::ExecutorRegistry::new();
        executors.register(
            rse_config::DeploymentMode::Server,
            Box::new(rse_admission::InMemoryExecutor::new()),
        );
        let settings = rse_config::Settings {
            deployment_mode: rse_config::DeploymentMode::Server,
            buckets: rse_config::BucketNames {
                rulesets: "rulesets".into(),
                reports: "reports".into(),
                recommendations: "recs".into(),
            },
            aws_region: "us-east-1".into(),
            event_partitions: 10,
            job_ttl_minutes: Some(180),
            batch_job_lifetime_minutes: 180,
            batch_job_log_level: "INFO".into(),
            system_customer_name: "SYSTEM".into(),
            aws_shard_count: 2,
            min_core_version: "1.0.0".into(),
            current_core_version: "1.2.0".into(),
            deployment_account_id: None,
        };
        let admission = Arc::new(rse_admission::AdmissionService::new(
            store.clone(),
            license_view.clone(),
            Arc::new(rse_admission::AllowAllLicenseManagerClient),
            Arc::new(rse_admission::InMemorySecretStore::new()),
            Arc::new(executors),
            settings,
        ));
        let bundle_io = rse_rulesets::RulesetBundleIo::new(
            aws_sdk_s3::Client::from_conf(
                aws_sdk_s3::config::Builder::new()
                    .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
                    .region(aws_sdk_s3::config::Region::new("us-east-1"))
                    .credentials_provider(aws_sdk_s3::config::Credentials::new(
                        "test", "test", None, None, "test",
                    ))
                    .build(),
            ),
            "rulesets",
        );
        let rulesets = Arc::new(rse_rulesets::RulesetService::new(
            store.clone(),
            bundle_io,
            "rulesets",
            "https://lm.example.test",
        ));
        let scheduled_jobs = Arc::new(rse_scheduled_jobs::ScheduledJobService::new(
            store.clone(),
            license_view,
            Arc::new(rse_scheduled_jobs::NullCronScheduler),
        ));
        AppState { store, admission, rulesets, scheduled_jobs }
    }

    #[tokio::test]
    async fn health_check_returns_200() {
        let app = build_app(test_state());
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn submit_job_rejects_unknown_tenant() {
        let app = build_app(test_state());
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/jobs")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "tenantName": "NOPE",
                            "customer": "C1",
                            "targetRegions": [],
                            "rulesets": [],
                            "rulesToScan": [],
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
