use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use stakeout_api::config::{AppConfig, Backend};
use stakeout_api::database;
use stakeout_api::server::{app, AppState};
use stakeout_api::services::seed;

#[derive(Parser)]
#[command(name = "stakeout-api")]
#[command(about = "Student marketplace API server")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides API_PORT)")]
    port: Option<u16>,

    #[arg(long, value_enum, help = "Storage backend (overrides STORE_BACKEND)")]
    backend: Option<Backend>,

    #[arg(long, help = "Insert the demo student before serving")]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DB_* and API_SECRET
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(backend) = args.backend {
        config.database.backend = backend;
    }
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting Stakeout API in {:?} mode", config.environment);

    let store = database::open_store(&config.database)
        .await
        .context("cannot open store")?;

    let port = config.api.port;
    let state = AppState::new(config, store).context("cannot build password hasher")?;

    if args.seed {
        seed::seed(state.store.as_ref(), &state.hasher)
            .await
            .context("seeding failed")?;
    }

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
