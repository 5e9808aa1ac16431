#![allow(dead_code)]

use axum::response::Response;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{Map, Value};
use std::sync::Arc;
use tempfile::TempDir;
use test_utils::{taxi_rows, write_config, write_parquet_reference};
use tower::util::ServiceExt;
use vigil_server::api::state::AppState;
use vigil_server::create_app;
use vigil_settings::VigilServerConfig;
use vigil_types::Row;

pub const DATASET: &str = "taxi";

pub struct TestHelper {
    app: Router,
    pub state: Arc<AppState>,
    // keeps the reference and config files alive
    _dir: TempDir,
}

impl TestHelper {
    pub async fn new(
        window_size: usize,
        calculation_period_sec: u64,
        monitors: &[&str],
    ) -> Result<Self, anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let reference = dir.path().join("reference.parquet");
        write_parquet_reference(&reference, &taxi_rows(0, 200));
        let config_path = write_config(
            dir.path(),
            &reference,
            window_size,
            calculation_period_sec,
            monitors,
        );

        let config = VigilServerConfig {
            config_path,
            ..Default::default()
        };
        let (app, state) = create_app(config).await?;

        Ok(Self {
            app,
            state,
            _dir: dir,
        })
    }

    pub async fn send_oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn post_json(&self, uri: &str, body: String) -> Response<Body> {
        let request = Request::builder()
            .uri(uri)
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        self.send_oneshot(request).await
    }

    pub async fn iterate(&self, dataset: &str, rows: &[Row]) -> Response<Body> {
        self.post_json(
            &format!("/iterate/{}", dataset),
            serde_json::to_string(rows).unwrap(),
        )
        .await
    }

    pub async fn metrics(&self) -> String {
        let request = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();

        let response = self.send_oneshot(request).await;
        body_text(response).await
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}

/// Column-oriented form of `rows`, as sent by dataframe clients.
pub fn to_columns(rows: &[Row]) -> Value {
    let mut columns: Map<String, Value> = Map::new();
    for (i, row) in rows.iter().enumerate() {
        for (key, value) in row {
            let column = columns
                .entry(key.clone())
                .or_insert_with(|| Value::Array(vec![Value::Null; rows.len()]));
            if let Value::Array(values) = column {
                values[i] = value.clone();
            }
        }
    }
    Value::Object(columns)
}
