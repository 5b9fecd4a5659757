use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "rse",
    about = "Cloud security rule engine control plane",
    version
)]
pub struct Cli {
    /// Path to the settings YAML (bucket names, AWS region, partition
    /// count, deployment mode — rse_config::Settings).
    #[arg(long, env = "RSE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Postgres connection string. Omit to run against the in-memory
    /// store (local dev / tests only).
    #[arg(long, env = "RSE_DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the server.
    Run {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },

    /// Sync DB indexes.
    CreateIndexes,

    /// Create blob-store buckets with lifecycle rules (7d for `on-demand/`
    /// and `meta/`, configurable for snapshots tagged `Type=DataSnapshot`).
    CreateBuckets {
        #[arg(long, default_value_t = 7)]
        on_demand_lifetime_days: u32,
        #[arg(long, default_value_t = 90)]
        snapshot_lifetime_days: u32,
    },

    /// Enable the secret-store engine and persist a generated signing key.
    InitVault {
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Store rule-metadata repo credentials.
    SetMetaRepos {
        /// `project:secret` pairs, one per repository.
        #[arg(long = "repositories", required = true, value_delimiter = ',')]
        repositories: Vec<String>,
    },

    /// Create the SYSTEM customer and initial SYSTEM user; print the
    /// generated password if not supplied.
    Init {
        #[arg(long, default_value = "SYSTEM")]
        customer: String,
        #[arg(long, env = "RSE_INIT_PASSWORD")]
        password: Option<String>,
    },

    /// Emit an OpenAPI 3.0 spec for the rse-api surface.
    GenerateOpenapi {
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Dump the enabled permissions enumeration.
    ShowPermissions,

    /// Regenerate request/response schema references.
    UpdateApiModels {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}
