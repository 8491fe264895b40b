//! Runtime helpers shared by the Parley backend binaries: tracing setup,
//! service bootstrap, and shutdown signalling.

use anyhow::Result;
use parley_config::AppConfig;
use sqlx::SqlitePool;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Everything the server binary needs after bootstrap
#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
}

impl BackendServices {
    /// Connect to the database and run migrations
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = parley_database::initialize_database(&config.database).await?;

        info!(url = %config.database.url, "backend services initialised");

        Ok(Self { db_pool })
    }
}

/// Resolves when the process receives ctrl-c
pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
