use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use project_management_api::config::{self, IdentitySource};
use project_management_api::database::DatabaseManager;
use project_management_api::{app, is_development, AppState};

#[derive(Parser)]
#[command(name = "project-management-api")]
#[command(about = "GraphQL project management API server")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Address to bind (overrides BIND_ADDRESS)")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = config::config();
    tracing::info!("Starting Project Management API in {:?} mode", config.environment);

    if config.security.identity_source == IdentitySource::Header && !is_development!() {
        tracing::warn!(
            "Role is taken from the unverified {} header; set SECURITY_IDENTITY_SOURCE=bearer behind untrusted clients",
            config.security.role_header
        );
    }

    let store = DatabaseManager::open(&config.database)
        .await
        .context("opening store")?;

    let router = app(AppState::new(store, config), config);

    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, router).await.context("server")?;
    Ok(())
}
