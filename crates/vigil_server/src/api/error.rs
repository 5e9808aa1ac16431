use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde_json::json;
use thiserror::Error;
use vigil_monitor::MonitorError;
use vigil_observability::ObservabilityError;
use vigil_types::TypeError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Monitoring service is not initialized")]
    NotInitialized,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    MonitorError(#[from] MonitorError),

    #[error(transparent)]
    TypeError(#[from] TypeError),

    #[error(transparent)]
    ObservabilityError(#[from] ObservabilityError),

    #[error("Iterate task failed: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidBody(_) | ServerError::TypeError(_) => StatusCode::BAD_REQUEST,
            ServerError::MonitorError(MonitorError::DatasetNotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let json_response = json!({
            "status": "error",
            "message": self.to_string(),
        });
        (self.status_code(), Json(json_response)).into_response()
    }
}
