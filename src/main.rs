use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use glpi_tickets_api::app::app;
use glpi_tickets_api::config::AppConfig;
use glpi_tickets_api::database::{DatabaseManager, MySqlTicketRepository};
use glpi_tickets_api::handlers::AppState;

/// Read-only HTTP API over GLPI tickets
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Address to bind (overrides API_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides API_PORT / PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DB_HOST, DB_NAME, etc. can live next to the binary
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!("Starting GLPI tickets API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect_lazy(&config.database).context("failed to configure database pool")?;
    let repository = MySqlTicketRepository::new(pool.clone(), &config.database);
    let app = app(AppState::new(Arc::new(repository)));

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("GLPI tickets API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    tracing::info!("Closed database pool");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
