pub mod api;

use crate::api::router::create_router;
use crate::api::setup::setup_logging;
use crate::api::shutdown::shutdown_signal;
use crate::api::state::AppState;
use anyhow::Context;
use axum::Router;
use std::sync::Arc;
use tracing::{info, warn};
use vigil_monitor::MonitoringService;
use vigil_observability::prometheus_handle;
use vigil_settings::{MonitoringConfig, VigilServerConfig};

/// Loads the monitoring config and every dataset reference.
///
/// Runs on the blocking pool since references are read from disk.
async fn load_service(config: &VigilServerConfig) -> Result<MonitoringService, anyhow::Error> {
    let config_path = config.config_path.clone();

    tokio::task::spawn_blocking(move || {
        let monitoring_config = MonitoringConfig::from_path(&config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?;
        MonitoringService::from_config(&monitoring_config)
            .context("Failed to initialize monitoring service")
    })
    .await
    .context("Monitoring service loader panicked")?
}

/// Create the main server
///
/// # Arguments
///
/// * `config` - The server configuration
///
/// # Returns
///
/// The main server router and its shared state
pub async fn create_app(
    config: VigilServerConfig,
) -> Result<(Router, Arc<AppState>), anyhow::Error> {
    // setup logging, soft fail if it fails
    let _ = setup_logging(&config.log_settings).await.is_ok();

    if prometheus_handle().is_none() {
        warn!("Service metrics are disabled, another recorder is installed");
    }

    let service = load_service(&config).await?;
    let app_state = Arc::new(AppState::with_service(config, service));

    let router = create_router(app_state.clone())
        .await
        .with_context(|| "Failed to create router")?;

    Ok((router, app_state))
}

/// Start the main server
pub async fn start_main_server(config: VigilServerConfig) -> Result<(), anyhow::Error> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let (router, _) = create_app(config).await?;

    info!("🚀 Vigil Server started successfully on {}", addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context(|| "Failed to start main server")?;

    Ok(())
}
