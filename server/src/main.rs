//! Nightflix storefront HTTP server.

use anyhow::Context;
use nightflix_postgres::PostgresTicketStore;
use nightflix_server::{Config, app, telemetry};
use nightflix_web::{AppState, build_router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal in production
    let dotenv = dotenvy::dotenv();

    telemetry::init_tracing();
    info!("Starting Nightflix storefront");
    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, "Failed to read .env file");
        }
    }

    let config = Config::from_env();
    info!(
        app_url = %config.storefront.app_url,
        require_gateway_verification = config.storefront.require_gateway_verification,
        allow_payment_simulation = config.storefront.allow_payment_simulation,
        "Configuration loaded"
    );

    let metrics_addr: SocketAddr = config
        .metrics_addr()
        .parse()
        .context("invalid METRICS_HOST/METRICS_PORT")?;
    telemetry::install_metrics_exporter(metrics_addr)?;

    info!("Connecting to ticket database...");
    let pool = app::connect_database(&config.database)
        .await
        .context("failed to connect to DATABASE_URL")?;
    let store = PostgresTicketStore::new(pool.clone());
    store.migrate().await?;
    info!("Ticket database ready");

    let lifecycle = app::build_lifecycle(&config, Arc::new(store))?;
    let router = build_router(AppState::new(lifecycle));

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(address = %addr, "Server listening");

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped, closing database pool...");
    if tokio::time::timeout(shutdown_timeout, pool.close()).await.is_err() {
        warn!("Database pool did not close within the shutdown timeout");
    }

    info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        }
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        }
    }
}
