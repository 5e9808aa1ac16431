use crate::common::{TestHelper, DATASET};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use test_utils::taxi_rows;

#[tokio::test]
async fn test_metrics_exposition() {
    let helper = TestHelper::new(5, 60, &["data_drift", "data_quality"])
        .await
        .unwrap();

    let response = helper.iterate(DATASET, &taxi_rows(300, 5)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = helper.send_oneshot(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));

    let text = crate::common::body_text(response).await;
    assert!(text.contains("# TYPE evidently:data_drift_share gauge"));
    assert!(text.contains("evidently:data_drift:feature_psi{dataset_name=\"taxi\",feature=\"trip_distance\",feature_type=\"num\"}"));
    assert!(text.contains("evidently:data_quality:missing_share{"));
    // text observations never become gauges
    assert!(!text.contains("most_common_value"));
    assert!(text.contains("vigil_rows_ingested"));
}

#[tokio::test]
async fn test_metrics_before_any_pass() {
    let helper = TestHelper::new(5, 60, &["data_drift"]).await.unwrap();

    let text = helper.metrics().await;

    assert!(!text.contains("evidently:"));
}
