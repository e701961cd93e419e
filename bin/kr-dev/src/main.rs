//! Keyring Development CLI
//!
//! Opens (or creates) the role database, seeds the configured permissions and
//! runs one role command against it:
//! - `list` (default) prints every role
//! - `create` creates a role
//! - `update` renames a role and optionally replaces its permissions
//! - `roles-cache` prints the role → permission map through the cache

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use kr_common::init_logging;
use kr_config::{AppConfig, ConfigLoader};
use kr_platform::shared::database;
use kr_platform::{
    BroadcastEventPublisher, CreateRoleCommand, DevDataSeeder, ExecutionContext,
    InMemoryPermissionCache, PermissionRepository, RoleRepository, RoleService,
    SqliteUnitOfWork, UpdateRoleCommand,
};

/// Keyring Development CLI
#[derive(Parser, Debug)]
#[command(name = "kr-dev")]
#[command(about = "Keyring development CLI - role and permission management on a local database")]
struct Args {
    /// Config file path (otherwise KEYRING_CONFIG or the standard locations)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Database URL, overriding the configured one
    #[arg(long)]
    database_url: Option<String>,

    /// Skip permission seeding
    #[arg(long, default_value = "false")]
    no_seed: bool,

    /// Principal recorded on events and audit entries
    #[arg(long, env = "KEYRING_PRINCIPAL", default_value = "kr-dev")]
    principal: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print all roles
    List,

    /// Create a role
    Create {
        #[arg(long)]
        name: String,

        /// Permission to grant; repeat for several
        #[arg(long = "permission", short = 'p')]
        permissions: Vec<String>,
    },

    /// Update a role
    Update {
        #[arg(long)]
        id: i64,

        #[arg(long)]
        name: String,

        /// Replacement permission; repeat for several, omit to keep the current set
        #[arg(long = "permission", short = 'p')]
        permissions: Vec<String>,
    },

    /// Print the role → permission map, loading it through the cache
    RolesCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let mut config: AppConfig = loader.load().context("Failed to load configuration")?;
    if let Some(url) = &args.database_url {
        config.database.url = url.clone();
    }

    init_logging("kr-dev", &config.logging);
    info!("Starting Keyring dev CLI");

    let pool = database::connect(&config.database)
        .await
        .context("Failed to open role database")?;
    database::init_schema(&pool).await?;

    if config.seed.enabled && !args.no_seed {
        DevDataSeeder::new(pool.clone())
            .seed(&config.seed.permissions)
            .await?;
    }

    let publisher = Arc::new(BroadcastEventPublisher::default());
    let cache = Arc::new(InMemoryPermissionCache::new(Duration::from_secs(
        config.cache.ttl_seconds,
    )));
    let cache_key = config.cache.permission_key.clone();
    let roles = Arc::new(RoleRepository::new(pool.clone()));
    let unit_of_work = Arc::new(SqliteUnitOfWork::new(pool.clone(), publisher));
    let service = RoleService::new(
        roles,
        unit_of_work,
        Arc::new(config),
        Arc::clone(&cache) as Arc<dyn kr_platform::PermissionCache>,
    )
    .with_cache_key(cache_key.clone());

    let ctx = ExecutionContext::create(args.principal.as_str());

    let output = match args.command.unwrap_or(Command::List) {
        Command::List => serde_json::to_string_pretty(&service.list().await?)?,
        Command::Create { name, permissions } => {
            let role = service
                .create(CreateRoleCommand::new(name, permissions), &ctx)
                .await?;
            serde_json::to_string_pretty(&role)?
        }
        Command::Update { id, name, permissions } => {
            let role = service
                .update(id, UpdateRoleCommand::new(name, permissions), &ctx)
                .await?;
            serde_json::to_string_pretty(&role)?
        }
        Command::RolesCache => {
            let permissions = PermissionRepository::new(pool.clone());
            let map = cache
                .get_or_load(&cache_key, || permissions.load_role_permission_map())
                .await?;
            serde_json::to_string_pretty(map.as_ref())?
        }
    };

    println!("{}", output);

    pool.close().await;
    Ok(())
}
