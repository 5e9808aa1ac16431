use crate::api::routes::{get_health_router, get_iterate_router, get_metrics_router};
use crate::api::state::AppState;
use anyhow::Result;
use axum::http::{header::CONTENT_TYPE, Method};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const ROUTE_PREFIX: &str = "";

/// Create the main router for the application
///
/// # Parameters
/// - `app_state` - The application state shared across all handlers
///
/// # Returns
///
/// The main router for the application
pub async fn create_router(app_state: Arc<AppState>) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    let health_routes = get_health_router(ROUTE_PREFIX).await?;
    let iterate_routes = get_iterate_router(ROUTE_PREFIX).await?;
    let metrics_routes = get_metrics_router(ROUTE_PREFIX).await?;

    Ok(Router::new()
        .merge(iterate_routes)
        .merge(metrics_routes)
        .merge(health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}
