//! HTTP endpoint server using Axum

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::config::ForecastConfig;
use crate::db::{PercentageStore, PostgresStore};
use crate::error::MovecastError;
use crate::forecast::{ForecastBlender, PredictorRegistry, RandomPicker, SystemClock};
use crate::metrics::Metrics;
use crate::models::{ForecastRequest, ForecastResult};

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub blender: Option<Arc<ForecastBlender>>,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

type ApiError = (StatusCode, Json<Value>);

/// Map a domain error to its HTTP status and a `{"detail": ...}` body
pub fn error_response(err: &MovecastError) -> ApiError {
    let status = match err {
        MovecastError::Validation(_) => StatusCode::BAD_REQUEST,
        MovecastError::ModelUnavailable(_) => StatusCode::NOT_FOUND,
        MovecastError::TransientStore(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "detail": err.to_string() })))
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Move Forecast API. POST /forecast to request a forecast."
    }))
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "forecast_available": state.blender.is_some(),
        "service": "movecast-forecast-api"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

/// Blend the branch forecast for a date window with the seasonal category share
async fn forecast(
    State(state): State<AppState>,
    Json(request): Json<ForecastRequest>,
) -> Result<Json<ForecastResult>, ApiError> {
    let blender = state.blender.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "detail": "Forecast service unavailable" })),
        )
    })?;

    match blender.forecast(&request).await {
        Ok(result) => {
            state.metrics.forecasts_total.inc();
            Ok(Json(result))
        }
        Err(e) => {
            state.metrics.forecast_failures_total.inc();
            match &e {
                MovecastError::Validation(_) | MovecastError::ModelUnavailable(_) => {
                    warn!(branch = %request.branch, date = %request.date, error = %e, "Forecast rejected")
                }
                _ => error!(branch = %request.branch, date = %request.date, error = %e, "Forecast failed"),
            }
            Err(error_response(&e))
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/forecast", post(forecast))
        .route("/forecast/", post(forecast))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);
    let start_time = Arc::new(Instant::now());
    let config = ForecastConfig::from_env()?;

    // Models are required; the store may come up later
    let predictors = Arc::new(PredictorRegistry::load_dir(&config.model_dir)?);

    let blender = match PostgresStore::connect(&crate::config::get_database_url()?).await {
        Ok(store) => {
            info!("PostgreSQL connected for API server");
            metrics.database_connected.set(1.0);
            let store: Arc<dyn PercentageStore> = Arc::new(store);
            Some(Arc::new(ForecastBlender::new(
                store,
                predictors,
                Arc::new(SystemClock),
                Arc::new(RandomPicker),
                config,
            )))
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to PostgreSQL - forecast endpoint will be unavailable");
            metrics.database_connected.set(0.0);
            None
        }
    };

    let state = AppState {
        health: Arc::new(RwLock::new(HealthStatus::default())),
        metrics: metrics.clone(),
        start_time: start_time.clone(),
        blender,
    };
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
