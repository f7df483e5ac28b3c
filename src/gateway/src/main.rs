use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::cli::{utils, CommonArgs, CommonCommands};
use gateway::{create_router, GatewayState};
use std::net::SocketAddr;
use tokio::sync::oneshot;

#[derive(Parser)]
#[command(name = "otelbridge-gateway")]
#[command(about = "otelbridge gateway - serves cleaned Prometheus and OTLP JSON metrics")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Option<GatewayCommands>,

    #[arg(long, help = "HTTP server port (overrides configuration)")]
    http_port: Option<u16>,

    #[arg(long, help = "Bind address for the HTTP server (overrides configuration)")]
    bind: Option<String>,
}

#[derive(Subcommand)]
enum GatewayCommands {
    #[command(flatten)]
    Common(CommonCommands),
}

impl Default for GatewayCommands {
    fn default() -> Self {
        Self::Common(CommonCommands::Start)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on CLI arguments
    utils::init_logging(&cli.common);

    // Load application configuration
    let mut config = utils::load_config(cli.common.config.as_ref())?;
    if let Some(port) = cli.http_port {
        config.http.port = port;
    }
    if let Some(bind) = cli.bind {
        config.http.bind = bind;
    }

    // Handle common commands that don't require starting the service
    let command = cli.command.unwrap_or_default();
    let GatewayCommands::Common(ref common_cmd) = command;
    if utils::handle_common_command(common_cmd, &config)? {
        return Ok(());
    }

    log::info!("Starting otelbridge gateway");
    log::info!("Proxying metrics from {}", config.upstream.url);

    let bind_ip = config
        .http
        .bind
        .parse::<std::net::IpAddr>()
        .context("Invalid bind address")?;
    let http_addr = SocketAddr::new(bind_ip, config.http.port);

    let state = GatewayState::from_config(&config).context("Failed to build gateway state")?;
    let app = create_router(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let http_handle = tokio::spawn(async move {
        log::info!("Starting HTTP server on {http_addr}");
        let listener = tokio::net::TcpListener::bind(http_addr)
            .await
            .expect("Failed to bind HTTP server");
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
                log::info!("HTTP server shutting down gracefully");
            })
            .await
            .expect("HTTP server error");
    });

    // Wait for shutdown signal (Ctrl+C)
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl+c signal")?;

    let _ = shutdown_tx.send(());
    let _ = http_handle.await;

    Ok(())
}
