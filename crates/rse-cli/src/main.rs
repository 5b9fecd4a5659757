mod cli;
mod commands;
mod openapi;
mod permissions;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run { host, port } => commands::run(host, port, cli.config, cli.database_url).await,
        Command::CreateIndexes => commands::create_indexes(cli.database_url).await,
        Command::CreateBuckets { on_demand_lifetime_days, snapshot_lifetime_days } => {
            commands::create_buckets(cli.config, on_demand_lifetime_days, snapshot_lifetime_days).await
        }
        Command::InitVault { output } => commands::init_vault(output).await,
        Command::SetMetaRepos { repositories } => commands::set_meta_repos(repositories).await,
        Command::Init { customer, password } => commands::init(customer, password).await,
        Command::GenerateOpenapi { output } => commands::generate_openapi(output).await,
        Command::ShowPermissions => commands::show_permissions().await,
        Command::UpdateApiModels { output } => commands::update_api_models(output).await,
    }
}
