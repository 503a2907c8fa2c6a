use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use usuarios_api::config::{AppConfig, StoreBackend};
use usuarios_api::database::{DatabaseManager, MemoryUserStore, PgUserStore, UserStore};
use usuarios_api::{build_router, AppState, HttpOptions};

#[derive(Parser)]
#[command(name = "usuarios-api")]
#[command(about = "User records REST API")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Address to bind (overrides HOST)")]
    host: Option<String>,

    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, value_enum, help = "User store backend (overrides USER_STORE)")]
    store: Option<StoreBackend>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("usuarios_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(store) = cli.store {
        config.database.backend = store;
    }
    tracing::info!("Starting usuarios-api in {:?} mode", config.environment);

    let store: Arc<dyn UserStore> = match config.database.backend {
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to the database")?;
            Arc::new(PgUserStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory user store; data is lost on exit");
            Arc::new(MemoryUserStore::new())
        }
    };

    let app = build_router(AppState::from_config(store, &config), HttpOptions::from(&config));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Server listening on http://{}", bind_addr);
    if config.docs.enabled {
        tracing::info!("API documentation at http://{}/api-docs", bind_addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
