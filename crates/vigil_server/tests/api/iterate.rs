use crate::common::{body_text, to_columns, TestHelper, DATASET};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use test_utils::taxi_rows;
use tower::util::ServiceExt;
use vigil_server::api::router::create_router;
use vigil_server::api::state::AppState;
use vigil_settings::VigilServerConfig;

const DRIFT_SHARE: &str = "evidently:data_drift_share{dataset_name=\"taxi\"}";

#[tokio::test]
async fn test_iterate_fills_window_then_publishes() {
    let helper = TestHelper::new(3, 0, &["data_drift"]).await.unwrap();
    let rows = taxi_rows(1000, 4);

    let response = helper.iterate(DATASET, &rows[..1]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
    assert!(!helper.metrics().await.contains(DRIFT_SHARE));

    // column-oriented batch completes the window
    let response = helper
        .post_json("/iterate/taxi", to_columns(&rows[1..3]).to_string())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(helper.metrics().await.contains(DRIFT_SHARE));

    let response = helper.iterate(DATASET, &rows[3..]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let service = helper.state.service().unwrap();
    let window = service.window_snapshot(DATASET).unwrap();
    assert_eq!(window.rows(), &rows[1..]);
}

#[tokio::test]
async fn test_failed_pass_still_returns_ok() {
    // a window without any prediction cannot be scored
    let helper = TestHelper::new(1, 0, &["regression_performance"]).await.unwrap();
    let mut row = taxi_rows(0, 1).remove(0);
    row.insert("prediction".to_string(), Value::Null);

    let response = helper.iterate(DATASET, &[row]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
    assert!(!helper.metrics().await.contains("regression_performance:quality"));
}

#[tokio::test]
async fn test_unknown_dataset() {
    let helper = TestHelper::new(3, 0, &["data_drift"]).await.unwrap();

    let response = helper.iterate("nonexistent", &taxi_rows(0, 2)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["status"], "error");

    let service = helper.state.service().unwrap();
    assert_eq!(service.window_snapshot(DATASET).unwrap().len(), 0);
}

#[tokio::test]
async fn test_malformed_body() {
    let helper = TestHelper::new(3, 0, &["data_drift"]).await.unwrap();

    let response = helper.post_json("/iterate/taxi", "not json".to_string()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mismatched = json!({"trip_distance": [1.0, 2.0], "fare_amount": [3.0]});
    let response = helper
        .post_json("/iterate/taxi", mismatched.to_string())
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_service_not_initialized() {
    let state = Arc::new(AppState::new(VigilServerConfig::default()));
    let app = create_router(state).await.unwrap();

    let request = Request::builder()
        .uri("/iterate/taxi")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("[]"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
