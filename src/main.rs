use anyhow::{Context, Result};
use common::config::Configuration;
use gateway::{create_router, GatewayState};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Configuration::load().context("Failed to load configuration")?;

    let bind_ip = config
        .http
        .bind
        .parse::<std::net::IpAddr>()
        .context("Invalid bind address")?;
    let http_addr = SocketAddr::new(bind_ip, config.http.port);

    let state = GatewayState::from_config(&config).context("Failed to build gateway state")?;
    let app = create_router(state);

    log::info!("Starting otelbridge on {http_addr}");
    log::info!("Proxying metrics from {}", config.upstream.url);

    let listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .context("Failed to bind HTTP server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            log::info!("Shutting down");
        })
        .await
        .context("HTTP server error")?;

    Ok(())
}
