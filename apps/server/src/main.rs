//! # Caixa POS Server
//!
//! Entry point: load config, open the database, restore the cart
//! snapshot, serve the API.

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use caixa_db::{Database, DbConfig};
use caixa_server::{routes, AppState, ServerConfig, SessionState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    info!("Starting Caixa POS server");

    let config = ServerConfig::load()?;
    info!(
        bind = %config.bind_addr,
        db = %config.database_path,
        terminal = %config.terminal_id,
        "Configuration loaded"
    );

    let db = Database::new(DbConfig::new(&config.database_path)).await?;

    // Crash recovery: pick the cart back up where the cashier left it.
    let session = match db.cart_snapshots().load(&config.terminal_id).await {
        Ok(Some(cart)) => {
            info!(lines = cart.line_count(), "Restored cart snapshot");
            SessionState::restore(cart)
        }
        Ok(None) => SessionState::new(),
        Err(e) => {
            warn!(error = %e, "Cart snapshot load failed, starting fresh");
            SessionState::new()
        }
    };

    let state = AppState::new(db.clone(), session, config.terminal_id);
    let app = routes::router(state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
