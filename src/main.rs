// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use payments_api::{
    api::router,
    config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
    storage::{connect_options, ensure_schema, wait_for_database, PaymentRepository},
};

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("SIGINT received, shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();
    init_tracing(config.log_format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        database_url = %config.database_url,
        "Starting payments API"
    );

    // Wait for the database, then make sure every table exists.
    let options = connect_options(&config.database_url)?;
    let pool = wait_for_database(options, config.readiness).await?;
    ensure_schema(&pool).await?;

    let state = AppState::new(PaymentRepository::new(pool));
    let app = router(state);

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Payments API listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
