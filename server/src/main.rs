use anyhow::Context;
use clap::Parser;
use parley_config::load as load_config;
use parley_gateway::{create_router, GatewayState};
use parley_runtime::{shutdown_signal, telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "parley-backend", about = "Parley messaging backend server")]
struct Cli {
    /// Path to a configuration file (overrides the default search)
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Listen port (overrides the configuration)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        std::env::set_var("PARLEY_CONFIG", path);
    }

    telemetry::init_tracing()?;

    info!("starting Parley backend");

    let mut config = load_config().context("failed to load configuration")?;
    if let Some(port) = cli.port {
        config.http.port = port;
    }

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let state = GatewayState::new(services.db_pool, config.auth.session_ttl_seconds);
    let app = create_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}
