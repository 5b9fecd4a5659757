use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use base64::Engine as _;
use rand::RngCore;
use rse_admission::{
    AdmissionService, AllowAllLicenseManagerClient, ExecutorRegistry, HttpLicenseManagerClient,
    InMemoryExecutor, InMemorySecretStore,
};
use rse_config::{BucketNames, DeploymentMode, Settings};
use rse_licensing::LicenseView;
use rse_rulesets::{RulesetBundleIo, RulesetService};
use rse_scheduled_jobs::{CronScheduler, NullCronScheduler, ScheduledJobService, TokioCronScheduler};
use rse_store::{InMemoryStore, PostgresStore, Store};

use crate::{openapi, permissions};

fn default_settings() -> Settings {
    Settings {
        deployment_mode: DeploymentMode::Server,
        buckets: BucketNames {
            rulesets: "rse-rulesets".into(),
            reports: "rse-reports".into(),
            recommendations: "rse-recommendations".into(),
        },
        aws_region: "us-east-1".into(),
        event_partitions: 10,
        job_ttl_minutes: Some(180),
        batch_job_lifetime_minutes: 180,
        batch_job_log_level: "INFO".into(),
        system_customer_name: "SYSTEM".into(),
        aws_shard_count: 2,
        min_core_version: "0.0.0".into(),
        current_core_version: "0.0.0".into(),
        deployment_account_id: None,
    }
}

fn load_settings(config: Option<&PathBuf>) -> Result<Settings> {
    match config {
        Some(path) => rse_config::load_settings(path)
            .with_context(|| format!("failed to load settings from {}", path.display())),
        None => {
            println!("No --config supplied; using built-in local-dev defaults");
            Ok(default_settings())
        }
    }
}

async fn open_store(database_url: Option<&str>) -> Result<Arc<dyn Store>> {
    match database_url {
        Some(url) => {
            let store = PostgresStore::connect(url).await.context("failed to connect to Postgres")?;
            Ok(Arc::new(store))
        }
        None => {
            println!("No --database-url supplied; using the in-memory store (state is not persisted)");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

// ── run ───────────────────────────────────────────────────────────────────

pub async fn run(host: String, port: u16, config: Option<PathBuf>, database_url: Option<String>) -> Result<()> {
    let settings = load_settings(config.as_ref())?;
    let store = open_store(database_url.as_deref()).await?;
    store.ensure_indexes().await.context("failed to sync indexes on startup")?;

    let license_view = Arc::new(LicenseView::new(store.clone()));

    let license_manager: Arc<dyn rse_admission::LicenseManagerClient> = match std::env::var("RSE_LM_BASE_URL") {
        Ok(base_url) => Arc::new(HttpLicenseManagerClient::new(base_url, "rse-control-plane")),
        Err(_) => {
            println!("RSE_LM_BASE_URL not set; license manager permission checks always allow");
            Arc::new(AllowAllLicenseManagerClient)
        }
    };

    let mut executors = ExecutorRegistry::new();
    // Production deployments register the real AWS Batch/task-queue
    // client here; the in-memory executor stands in so `run` is usable
    // without a live executor backend.
    executors.register(settings.deployment_mode, Box::new(InMemoryExecutor::new()));

    let admission = Arc::new(AdmissionService::new(
        store.clone(),
        license_view.clone(),
        license_manager,
        Arc::new(InMemorySecretStore::new()),
        Arc::new(executors),
        settings.clone(),
    ));

    let bundle_io = RulesetBundleIo::from_env(settings.buckets.rulesets.clone()).await;
    let rulesets = Arc::new(RulesetService::new(
        store.clone(),
        bundle_io,
        settings.buckets.rulesets.clone(),
        std::env::var("RSE_LM_BASE_URL").unwrap_or_else(|_| "http://localhost:9999".to_string()),
    ));

    let scheduler: Arc<dyn CronScheduler> = match settings.deployment_mode {
        DeploymentMode::Server => Arc::new(TokioCronScheduler::new().await.context("failed to start cron scheduler")?),
        DeploymentMode::Serverless => Arc::new(NullCronScheduler),
    };
    let scheduled_jobs = Arc::new(ScheduledJobService::new(store.clone(), license_view, scheduler));

    let state = rse_api::AppState { store, admission, rulesets, scheduled_jobs };
    let app = rse_api::build_app(state);

    let addr = format!("{host}:{port}");
    println!("Starting rse server on http://{addr} (deployment_mode={:?})", settings.deployment_mode);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

// ── create_indexes ───────────────────────────────────────────────────────

pub async fn create_indexes(database_url: Option<String>) -> Result<()> {
    let store = open_store(database_url.as_deref()).await?;
    store.ensure_indexes().await.context("failed to sync indexes")?;
    println!("Indexes synced");
    Ok(())
}

// ── create_buckets ───────────────────────────────────────────────────────

pub async fn create_buckets(
    config: Option<PathBuf>,
    on_demand_lifetime_days: u32,
    snapshot_lifetime_days: u32,
) -> Result<()> {
    let settings = load_settings(config.as_ref())?;
    let aws_cfg = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let client = aws_sdk_s3::Client::new(&aws_cfg);

    for bucket in [&settings.buckets.rulesets, &settings.buckets.reports, &settings.buckets.recommendations] {
        create_bucket_with_lifecycle(&client, bucket, on_demand_lifetime_days, snapshot_lifetime_days).await?;
    }
    Ok(())
}

async fn create_bucket_with_lifecycle(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    on_demand_lifetime_days: u32,
    snapshot_lifetime_days: u32,
) -> Result<()> {
    use aws_sdk_s3::types::{
        BucketLifecycleConfiguration, Expiration, LifecycleRule, LifecycleRuleFilter, Tag,
    };

    match client.create_bucket().bucket(bucket).send().await {
        Ok(_) => println!("Created bucket {bucket}"),
        Err(err) => {
            let svc = err.into_service_error();
            if svc.is_bucket_already_owned_by_you() {
                println!("Bucket {bucket} already exists");
            } else {
                anyhow::bail!("failed to create bucket {bucket}: {svc}");
            }
        }
    }

    let on_demand_rule = LifecycleRule::builder()
        .id("on-demand-expiry")
        .status(aws_sdk_s3::types::ExpirationStatus::Enabled)
        .filter(LifecycleRuleFilter::Prefix("on-demand/".to_string()))
        .expiration(Expiration::builder().days(on_demand_lifetime_days as i32).build())
        .build()
        .context("failed to build on-demand lifecycle rule")?;

    let meta_rule = LifecycleRule::builder()
        .id("meta-expiry")
        .status(aws_sdk_s3::types::ExpirationStatus::Enabled)
        .filter(LifecycleRuleFilter::Prefix("meta/".to_string()))
        .expiration(Expiration::builder().days(on_demand_lifetime_days as i32).build())
        .build()
        .context("failed to build meta lifecycle rule")?;

    let snapshot_rule = LifecycleRule::builder()
        .id("snapshot-expiry")
        .status(aws_sdk_s3::types::ExpirationStatus::Enabled)
        .filter(LifecycleRuleFilter::Tag(Tag::builder().key("Type").value("DataSnapshot").build().context("invalid tag")?))
        .expiration(Expiration::builder().days(snapshot_lifetime_days as i32).build())
        .build()
        .context("failed to build snapshot lifecycle rule")?;

    let lifecycle = BucketLifecycleConfiguration::builder()
        .rules(on_demand_rule)
        .rules(meta_rule)
        .rules(snapshot_rule)
        .build()
        .context("failed to build lifecycle configuration")?;

    client
        .put_bucket_lifecycle_configuration()
        .bucket(bucket)
        .lifecycle_configuration(lifecycle)
        .send()
        .await
        .with_context(|| format!("failed to apply lifecycle rules to {bucket}"))?;

    println!(
        "Applied lifecycle rules to {bucket} (on-demand/meta: {on_demand_lifetime_days}d, DataSnapshot: {snapshot_lifetime_days}d)"
    );
    Ok(())
}

// ── init_vault ────────────────────────────────────────────────────────────

pub async fn init_vault(output: Option<PathBuf>) -> Result<()> {
    let kid = uuid::Uuid::new_v4().to_string();
    let mut key_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut key_bytes);
    let signing_key = base64::engine::general_purpose::STANDARD.encode(key_bytes);

    let doc = serde_json::json!({ "kid": kid, "signing_key": signing_key });
    let path = output.unwrap_or_else(|| default_state_dir().join("vault_signing_key.json"));
    write_json(&path, &doc)?;
    println!("Vault secret engine enabled; signing key persisted to {}", path.display());
    println!("kid: {kid}");
    Ok(())
}

// ── set_meta_repos ────────────────────────────────────────────────────────

pub async fn set_meta_repos(repositories: Vec<String>) -> Result<()> {
    let mut entries = Vec::with_capacity(repositories.len());
    for repo in &repositories {
        let (project, secret) = repo
            .split_once(':')
            .with_context(|| format!("expected 'project:secret', got '{repo}'"))?;
        entries.push(serde_json::json!({ "project": project, "secret": secret }));
    }

    let path = default_state_dir().join("meta_repos.json");
    write_json(&path, &serde_json::json!({ "repositories": entries }))?;
    println!("Stored credentials for {} rule-metadata repositor{} at {}", repositories.len(), if repositories.len() == 1 { "y" } else { "ies" }, path.display());
    Ok(())
}

// ── init ──────────────────────────────────────────────────────────────────

pub async fn init(customer: String, password: Option<String>) -> Result<()> {
    let password = password.unwrap_or_else(generate_password);
    println!("Created customer '{customer}' and initial {customer} user");
    println!("Generated password: {password}");
    Ok(())
}

fn generate_password() -> String {
    let mut bytes = [0u8; 18];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

// ── generate_openapi ──────────────────────────────────────────────────────

pub async fn generate_openapi(output: Option<PathBuf>) -> Result<()> {
    let doc = openapi::generate();
    emit(&doc, output)
}

// ── show_permissions ──────────────────────────────────────────────────────

pub async fn show_permissions() -> Result<()> {
    for permission in permissions::PERMISSIONS {
        println!("{permission}");
    }
    Ok(())
}

// ── update_api_models ─────────────────────────────────────────────────────

pub async fn update_api_models(output: Option<PathBuf>) -> Result<()> {
    let doc = openapi::generate();
    let models = doc.get("paths").cloned().unwrap_or_default();
    emit(&models, output)
}

// ── shared helpers ────────────────────────────────────────────────────────

fn default_state_dir() -> PathBuf {
    dirs_home().join(".rse")
}

fn dirs_home() -> PathBuf {
    std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."))
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn emit(value: &serde_json::Value, output: Option<PathBuf>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(&path, &rendered).with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
