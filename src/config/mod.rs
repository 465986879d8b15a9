//! Environment-driven configuration

use crate::error::{MovecastError, Result};
use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HORIZON: &str = "2025-12-31";
pub const DEFAULT_FLOOR_PERCENTAGE: f64 = 1.0;
pub const DEFAULT_BATCH_SIZE: usize = 1000;
/// Every Sunday at 03:00
pub const DEFAULT_REBUILD_CRON: &str = "0 0 3 * * Sun";

/// Deployment environment, e.g. "production" or "sandbox"
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

pub fn get_database_url() -> Result<String> {
    env::var("DATABASE_URL")
        .map_err(|_| MovecastError::Config("DATABASE_URL environment variable not set".into()))
}

pub fn get_redis_url() -> String {
    env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/".to_string())
}

pub fn get_rebuild_cron() -> String {
    env::var("REBUILD_CRON").unwrap_or_else(|_| DEFAULT_REBUILD_CRON.to_string())
}

/// Parse an optional environment variable, falling back to `default` when unset
fn env_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| MovecastError::Config(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

/// Settings for the forecast blender
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// Last date the predictors are trusted for
    pub horizon: NaiveDate,
    /// Percentage used when neither an exact-day nor a monthly value exists
    pub floor_percentage: f64,
    pub model_dir: PathBuf,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default(),
            floor_percentage: DEFAULT_FLOOR_PERCENTAGE,
            model_dir: PathBuf::from("models"),
        }
    }
}

impl ForecastConfig {
    pub fn from_env() -> Result<Self> {
        let horizon_raw = env::var("FORECAST_HORIZON").unwrap_or_else(|_| DEFAULT_HORIZON.into());
        let horizon = NaiveDate::parse_from_str(horizon_raw.trim(), "%Y-%m-%d").map_err(|e| {
            MovecastError::Config(format!("FORECAST_HORIZON must be YYYY-MM-DD: {}", e))
        })?;

        Ok(Self {
            horizon,
            floor_percentage: env_or("FLOOR_PERCENTAGE", DEFAULT_FLOOR_PERCENTAGE)?,
            model_dir: PathBuf::from(env::var("MODEL_DIR").unwrap_or_else(|_| "models".into())),
        })
    }
}

/// Settings for a percentage aggregation run
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub min_year: i32,
    pub max_year: i32,
    pub batch_size: usize,
    pub checkpoint_path: PathBuf,
    /// Retries made against the store at the read and commit boundaries
    pub store_retries: usize,
    /// First backoff delay; doubles on each retry
    pub retry_delay: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            min_year: 2021,
            max_year: 2024,
            batch_size: DEFAULT_BATCH_SIZE,
            checkpoint_path: PathBuf::from("checkpoint.json"),
            store_retries: 5,
            retry_delay: Duration::from_millis(500),
        }
    }
}

impl AggregatorConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            min_year: env_or("MIN_YEAR", defaults.min_year)?,
            max_year: env_or("MAX_YEAR", defaults.max_year)?,
            batch_size: env_or("BATCH_SIZE", defaults.batch_size)?,
            checkpoint_path: env::var("CHECKPOINT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.checkpoint_path),
            store_retries: env_or("STORE_RETRIES", defaults.store_retries)?,
            retry_delay: Duration::from_millis(env_or("RETRY_DELAY_MS", 500u64)?),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_year > self.max_year {
            return Err(MovecastError::Config(format!(
                "MIN_YEAR ({}) is after MAX_YEAR ({})",
                self.min_year, self.max_year
            )));
        }
        if self.batch_size == 0 {
            return Err(MovecastError::Config("BATCH_SIZE must be > 0".into()));
        }
        Ok(())
    }
}
