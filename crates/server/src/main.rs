//! druglabel-server: label query filter service binary entrypoint.

use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use druglabel_server::config::Config;
use druglabel_server::db::{self, QueryLogRepository};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();

    // Create query log pool
    let query_log = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).expect("Failed to create database pool");
            tracing::info!("Query log enabled");
            Some(QueryLogRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, query log disabled");
            None
        }
    };

    // Log startup info
    if config.oracle_api_key.is_some() {
        tracing::info!(
            model = %config.oracle_model,
            timeout_secs = config.oracle_timeout.as_secs(),
            "Oracle configured, filter extraction enabled"
        );
    } else {
        tracing::warn!("GROQ_API_KEY not set, filter extraction disabled");
    }
    tracing::info!("Rate limiting: {} requests/second", config.rate_limit_rps);

    // Build application
    let app = druglabel_server::build_app(&config, query_log);

    // Start server
    let addr: SocketAddr = config.bind_address.parse().expect("Invalid bind address");
    tracing::info!("Starting label query server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    tracing::info!("Server shutdown complete");
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
