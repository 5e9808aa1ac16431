use crate::api::state::AppState;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;
use vigil_observability::render_service_metrics;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

/// Prometheus exposition of every published gauge followed by the service's own counters.
///
/// Never fails: whatever could be rendered is returned.
pub async fn get_metrics(State(data): State<Arc<AppState>>) -> impl IntoResponse {
    let mut body = String::new();

    if let Ok(service) = data.service() {
        match service.registry().render() {
            Ok(text) => body.push_str(&text),
            Err(e) => error!("Failed to render gauge registry: {:?}", e),
        }
    }

    body.push_str(&render_service_metrics());

    ([(header::CONTENT_TYPE, TEXT_FORMAT)], body)
}

pub async fn get_metrics_router(prefix: &str) -> Result<Router<Arc<AppState>>> {
    let result = catch_unwind(AssertUnwindSafe(|| {
        Router::new().route(&format!("{}/metrics", prefix), get(get_metrics))
    }));

    match result {
        Ok(router) => Ok(router),
        Err(_) => {
            // panic
            Err(anyhow::anyhow!("Failed to create metrics router"))
                .context("Panic occurred while creating the router")
        }
    }
}
