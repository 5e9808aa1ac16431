use crate::api::error::ServerError;
use crate::api::state::AppState;
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::post,
    Json, Router,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};
use vigil_monitor::IterateOutcome;
use vigil_types::IncomingRows;

/// Ingests a batch of rows for one dataset.
///
/// Answers `ok` whenever the rows were accepted, whether or not a metrics
/// pass ran.
pub async fn iterate(
    State(data): State<Arc<AppState>>,
    Path(dataset): Path<String>,
    body: Result<Json<IncomingRows>, JsonRejection>,
) -> Result<&'static str, ServerError> {
    let service = data.service()?;
    let Json(incoming) = body.map_err(|e| ServerError::InvalidBody(e.body_text()))?;
    let rows = incoming.into_rows()?;

    let outcome = tokio::task::spawn_blocking(move || service.iterate(&dataset, rows))
        .await
        .map_err(|e| {
            error!("Iterate task failed: {:?}", e);
            ServerError::from(e)
        })??;

    if let IterateOutcome::ComputationFailed { error } = &outcome {
        debug!("Rows accepted but the metrics pass failed: {}", error);
    }

    Ok("ok")
}

pub async fn get_iterate_router(prefix: &str) -> Result<Router<Arc<AppState>>> {
    let result = catch_unwind(AssertUnwindSafe(|| {
        Router::new().route(&format!("{}/iterate/{{dataset}}", prefix), post(iterate))
    }));

    match result {
        Ok(router) => Ok(router),
        Err(_) => {
            // panic
            Err(anyhow::anyhow!("Failed to create iterate router"))
                .context("Panic occurred while creating the router")
        }
    }
}
