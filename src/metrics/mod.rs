//! Prometheus metrics for the forecast API and the aggregation job

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    pub forecasts_total: IntCounter,
    pub forecast_failures_total: IntCounter,
    pub database_connected: Gauge,
    pub aggregator_combinations_visited: IntCounter,
    pub aggregator_rows_upserted: IntCounter,
    pub aggregator_combinations_skipped: IntCounter,
    pub aggregator_batch_failures: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total number of HTTP requests")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests currently being served")?;
        let forecasts_total = IntCounter::new("forecasts_total", "Forecasts produced")?;
        let forecast_failures_total =
            IntCounter::new("forecast_failures_total", "Forecast requests that failed")?;
        let database_connected = Gauge::new(
            "database_connected",
            "1 when the percentage store is reachable, 0 otherwise",
        )?;
        let aggregator_combinations_visited = IntCounter::new(
            "aggregator_combinations_visited",
            "Combinations visited by the aggregator, including resumed skips",
        )?;
        let aggregator_rows_upserted = IntCounter::new(
            "aggregator_rows_upserted",
            "Seasonal percentage rows committed",
        )?;
        let aggregator_combinations_skipped = IntCounter::new(
            "aggregator_combinations_skipped",
            "Combinations skipped because of zero totals or processing errors",
        )?;
        let aggregator_batch_failures = IntCounter::new(
            "aggregator_batch_failures",
            "Batch commits that failed after retries",
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(forecasts_total.clone()))?;
        registry.register(Box::new(forecast_failures_total.clone()))?;
        registry.register(Box::new(database_connected.clone()))?;
        registry.register(Box::new(aggregator_combinations_visited.clone()))?;
        registry.register(Box::new(aggregator_rows_upserted.clone()))?;
        registry.register(Box::new(aggregator_combinations_skipped.clone()))?;
        registry.register(Box::new(aggregator_batch_failures.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            forecasts_total,
            forecast_failures_total,
            database_connected,
            aggregator_combinations_visited,
            aggregator_rows_upserted,
            aggregator_combinations_skipped,
            aggregator_batch_failures,
        })
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
