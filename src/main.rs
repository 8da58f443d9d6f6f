//! Payment Relay Server - Main Application Entry Point
//!
//! Relays payment notifications from the payment processor to the game
//! server and serves the payment web pages.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Outbound Calls**: reqwest with 10s connect/read timeouts
//! - **Concurrency**: fixed pool of 10 request permits
//! - **Format**: JSON requests/responses, plain-text static file errors
//!
//! # Startup Flow
//!
//! 1. Initialise logging
//! 2. Load configuration from the command line, environment and properties file
//! 3. Build the HTTP client and router
//! 4. Start server on the configured port, stop on Ctrl+C or SIGTERM

use clap::Parser;
use tracing_subscriber::EnvFilter;

use payment_relay::{AppState, Config};

#[derive(Debug, Parser)]
#[command(name = "payment_relay_server")]
#[command(about = "Relays payment processor notifications to the game server", long_about = None)]
struct Cli {
    /// Port to listen on; overrides SERVER_PORT. Invalid values fall back to 8080.
    port: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    tracing::info!("Starting payment relay server");

    let cli = Cli::parse();
    let config = Config::load(cli.port.as_deref())?;
    tracing::info!(
        game_server = %config.game_server_endpoint(),
        auto_approve_threshold = config.auto_approve_threshold,
        static_dir = %config.static_dir.display(),
        worker_pool_size = config.worker_pool_size,
        processor = ?config.processor,
        "Configuration loaded"
    );

    let port = config.server_port;
    let state = AppState::new(config)?;
    let app = payment_relay::router(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://localhost:{}/", port);
    tracing::info!(
        "Payment endpoint: http://localhost:{}/api/payment/process",
        port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Payment relay server stopped");
    Ok(())
}

/// Wait for Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server");
}
