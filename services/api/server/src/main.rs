use anyhow::Context;
use data_connector_client::DataConnectorClient;
use fleet_api::metrics::ServerMetrics;
use fleet_api::shutdown::{ShutdownCoordinator, listen_for_shutdown_signals};
use fleet_query::FleetQueryService;
use mygeotab_client::MyGeotabClient;
use std::sync::Arc;
use telemetry::metrics::Telemetry;

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;

fn main() {
    let version = fleet_api::routes::VERSION.unwrap_or("unknown").to_string();
    let config = match fleet_api::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to build tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    runtime.block_on(async {
        if let Err(e) = setup(config, version).await {
            tracing::error!("Fatal error during setup: {e:#}");
            std::process::exit(1);
        }
    });
}

async fn setup(config: fleet_api::Config, version: String) -> anyhow::Result<()> {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.rust_log))
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize tracing filter")?;

    let use_json = config.log_format != "pretty";

    if use_json {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_timer(UtcTime::rfc_3339())
            .with_target(true)
            .with_level(true)
            .json();
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .pretty();
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    };

    let addr: String = format!("0.0.0.0:{}", config.api_service_port);
    tracing::info!(%version, "Starting fleet-api service at: {addr}");

    let mygeotab = MyGeotabClient::new(config.mygeotab_timeout())
        .context("Failed to build MyGeotab client")?;
    let data_connector =
        DataConnectorClient::new(config.data_connector_timeout())
            .context("Failed to build Data Connector client")?;
    let fleet =
        FleetQueryService::new(Arc::new(mygeotab), Arc::new(data_connector));

    let shutdown = Arc::new(ShutdownCoordinator::new());

    let metrics =
        ServerMetrics::new(None).context("Failed to create server metrics")?;
    let telemetry = Telemetry::new(Some(metrics));
    tracing::info!("Initialized telemetry");

    let app_state = fleet_api::AppState {
        telemetry,
        fleet,
        config: Arc::new(config),
        shutdown: shutdown.clone(),
    };
    let app = fleet_api::routes::app(app_state);

    // Spawn shutdown signal handler
    let shutdown_handle = shutdown.clone();
    tokio::spawn(async move {
        listen_for_shutdown_signals().await;
        shutdown_handle.shutdown();
    });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    let shutdown_for_serve = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_for_serve.wait_for_shutdown().await
        })
        .await
        .context("Server exited with error")?;

    tracing::info!("Server stopped");
    Ok(())
}
