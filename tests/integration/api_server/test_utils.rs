//! Test utilities for API server integration tests

use crate::fixtures::{date, forecast_config, june_local_rows, row, ConstantPredictor, LOCAL};
use axum_test::TestServer;
use movecast::core::http::{create_router, AppState, HealthStatus};
use movecast::db::MemoryStore;
use movecast::forecast::{FixedClock, FixedPicker, ForecastBlender, PredictorRegistry};
use movecast::metrics::Metrics;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Test helper for API server integration tests
#[allow(dead_code)]
pub struct TestApiServer {
    pub server: TestServer,
    pub metrics: Arc<Metrics>,
}

impl TestApiServer {
    /// Dallas has a model and June percentages; Austin has percentages only
    pub async fn new() -> Self {
        let mut rows = june_local_rows();
        rows.push(row("Austin", LOCAL, 6, 1, 10.0));
        let store = Arc::new(MemoryStore::new().with_percentages(rows));
        let predictors = PredictorRegistry::new()
            .with_predictor("Dallas", Arc::new(ConstantPredictor(100.0)));
        let blender = ForecastBlender::new(
            store,
            Arc::new(predictors),
            Arc::new(FixedClock(date(2025, 6, 1))),
            Arc::new(FixedPicker(0)),
            forecast_config(),
        );
        Self::build(Some(Arc::new(blender)))
    }

    /// Server whose store never came up
    pub async fn without_blender() -> Self {
        Self::build(None)
    }

    fn build(blender: Option<Arc<ForecastBlender>>) -> Self {
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let state = AppState {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics: metrics.clone(),
            start_time: Arc::new(Instant::now()),
            blender,
        };

        let app = create_router(state);
        let server = TestServer::new(app).expect("start test server");

        Self { server, metrics }
    }
}
