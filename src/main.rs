//! CodeHub Server: shared project workspaces with per-resource permissions.
//!
//! Main entry point that loads configuration, initializes logging, picks the
//! repository backend, and starts the server.

use tracing_subscriber::{EnvFilter, fmt};

use codehub_core::config::{AppConfig, StorageBackend};
use codehub_core::error::AppError;
use codehub_database::{DatabasePool, Repositories, migration};

#[tokio::main]
async fn main() {
    let env = std::env::var("CODEHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration (env: {env}): {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging. `RUST_LOG` overrides the configured level.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CodeHub v{}", env!("CARGO_PKG_VERSION"));

    let (repos, pool) = match config.database.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory backend; data is lost on exit");
            (Repositories::memory(), None)
        }
        StorageBackend::Postgres => {
            let pool = DatabasePool::connect(&config.database).await?;
            if config.database.run_migrations {
                migration::run_migrations(pool.pool()).await?;
            }
            (Repositories::postgres(pool.pool().clone()), Some(pool))
        }
    };

    let result = codehub_api::run_server(config, repos).await;

    if let Some(pool) = pool {
        pool.close().await;
    }

    result
}
