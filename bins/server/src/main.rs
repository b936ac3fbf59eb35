//! Fiado API Server
//!
//! Main entry point for the Fiado debt-tracking backend.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fiado_api::{AppState, create_router};
use fiado_db::{SessionRepository, connect};
use fiado_shared::{AppConfig, SorobanGateway};

/// How often expired sessions are swept from the store.
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fiado=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Ledger gateway for best-effort anchoring
    let ledger = SorobanGateway::new(config.ledger.clone());
    info!(rpc_url = %config.ledger.rpc_url, "Ledger gateway configured");

    // Create application state
    let state = AppState {
        db: Arc::new(db.clone()),
        ledger: Arc::new(ledger),
    };

    // Periodic sweep of expired sessions
    let sessions = SessionRepository::new(db);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            match sessions.purge_expired().await {
                Ok(0) => {}
                Ok(n) => info!(purged = n, "Expired sessions purged"),
                Err(e) => warn!(error = %e, "Session purge failed"),
            }
        }
    });

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
