//! Integration tests for the API Server
//!
//! Tests HTTP endpoints, health checks, metrics and the forecast route.

#[path = "api_server/test_utils.rs"]
mod test_utils;

use serde_json::{json, Value};

use test_utils::TestApiServer;

#[tokio::test]
async fn root_returns_welcome_message() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert!(body["message"].as_str().unwrap().starts_with("Welcome to the Move Forecast API"));
}

#[tokio::test]
async fn health_endpoint_reports_healthy_status() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_u64().is_some());
    assert_eq!(body["service"], "movecast-forecast-api");
    assert_eq!(body["forecast_available"], true);
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_metrics() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/metrics").await;
    assert_eq!(response.status_code(), 200);

    let body = response.text();
    for name in [
        "http_requests_total",
        "http_request_duration_seconds",
        "http_requests_in_flight",
        "forecasts_total",
        "aggregator_rows_upserted",
    ] {
        assert!(body.contains(name), "Expected {} metric", name);
    }
}

#[tokio::test]
async fn forecast_without_category_returns_raw_totals() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .post("/forecast")
        .json(&json!({"date": "2025-06-03", "branch": "Dallas"}))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["branch"], "Dallas");
    assert_eq!(body["category"], Value::Null);
    assert_eq!(body["forecast_window"]["start"], "2025-06-01");
    assert_eq!(body["forecast_window"]["end"], "2025-06-15");
    assert_eq!(body["total_predicted_moves"], 1500);
    assert_eq!(body["average_daily_moves"], 100);

    let days = body["predicted_summary"].as_array().unwrap();
    assert_eq!(days.len(), 15);
    assert_eq!(days[0]["date"], "2025-06-01");
    assert_eq!(days[0]["predicted_moves"], 100);
    assert!(days[0].get("raw_moves").is_none());
}

#[tokio::test]
async fn forecast_with_move_type_alias_blends_percentages() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .post("/forecast/")
        .json(&json!({"date": "2025-06-03", "branch": "Dallas", "move_type": "Local"}))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["category"], "Local");
    assert_eq!(body["total_predicted_moves"], 375);
    assert_eq!(body["predicted_summary"][0]["predicted_moves"], 25);
    assert!(body["summary_comment"].as_str().unwrap().contains("Dallas"));
}

#[tokio::test]
async fn unknown_branch_is_bad_request() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .post("/forecast")
        .json(&json!({"date": "2025-06-03", "branch": "Houston"}))
        .await;
    assert_eq!(response.status_code(), 400);

    let body: Value = response.json();
    assert!(body["detail"].as_str().unwrap().contains("Branch Houston not found"));
}

#[tokio::test]
async fn date_past_horizon_is_bad_request() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .post("/forecast")
        .json(&json!({"date": "2026-02-01", "branch": "Dallas"}))
        .await;
    assert_eq!(response.status_code(), 400);

    let body: Value = response.json();
    assert_eq!(body["detail"], "Date must be on or before 2025-12-31");
}

#[tokio::test]
async fn branch_without_model_is_not_found() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .post("/forecast")
        .json(&json!({"date": "2025-06-03", "branch": "Austin"}))
        .await;
    assert_eq!(response.status_code(), 404);

    let body: Value = response.json();
    assert_eq!(body["detail"], "No pre-trained model for branch Austin");
}

#[tokio::test]
async fn forecast_unavailable_without_store() {
    let app = TestApiServer::without_blender().await;
    let response = app
        .server
        .post("/forecast")
        .json(&json!({"date": "2025-06-03", "branch": "Dallas"}))
        .await;
    assert_eq!(response.status_code(), 503);
}

#[tokio::test]
async fn forecast_outcomes_are_counted() {
    let app = TestApiServer::new().await;
    app.server
        .post("/forecast")
        .json(&json!({"date": "2025-06-03", "branch": "Dallas"}))
        .await;
    app.server
        .post("/forecast")
        .json(&json!({"date": "not-a-date", "branch": "Dallas"}))
        .await;

    assert_eq!(app.metrics.forecasts_total.get(), 1);
    assert_eq!(app.metrics.forecast_failures_total.get(), 1);
    assert_eq!(app.metrics.http_requests_total.get(), 2);
}
