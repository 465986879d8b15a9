//! Per-branch raw volume predictors and the startup registry that holds them

use crate::error::{MovecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

const DAYS_PER_YEAR: f64 = 365.25;

/// Opaque trained model for one branch.
///
/// Deterministic for a given model; values may be fractional or negative,
/// callers clip and round.
pub trait Predictor: Send + Sync {
    fn predict(&self, dates: &[NaiveDate]) -> Vec<(NaiveDate, f64)>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityMode {
    Additive,
    Multiplicative,
}

/// One yearly Fourier term, order k = position in the list + 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FourierTerm {
    pub cos: f64,
    pub sin: f64,
}

/// Linear trend with yearly Fourier seasonality, stored as a JSON artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalTrendModel {
    pub branch: String,
    /// Day zero of the trend
    pub origin: NaiveDate,
    pub intercept: f64,
    /// Trend change per day
    pub slope: f64,
    #[serde(default)]
    pub yearly: Vec<FourierTerm>,
    pub mode: SeasonalityMode,
}

impl SeasonalTrendModel {
    pub fn value_at(&self, date: NaiveDate) -> f64 {
        let t = (date - self.origin).num_days() as f64;
        let trend = self.intercept + self.slope * t;
        let seasonal: f64 = self
            .yearly
            .iter()
            .enumerate()
            .map(|(i, term)| {
                let angle = 2.0 * PI * (i + 1) as f64 * t / DAYS_PER_YEAR;
                term.cos * angle.cos() + term.sin * angle.sin()
            })
            .sum();

        match self.mode {
            SeasonalityMode::Additive => trend + seasonal,
            SeasonalityMode::Multiplicative => trend * (1.0 + seasonal),
        }
    }
}

impl Predictor for SeasonalTrendModel {
    fn predict(&self, dates: &[NaiveDate]) -> Vec<(NaiveDate, f64)> {
        dates.iter().map(|&d| (d, self.value_at(d))).collect()
    }
}

/// Read-only map of branch -> predictor, built once at startup
#[derive(Default, Clone)]
pub struct PredictorRegistry {
    predictors: HashMap<String, Arc<dyn Predictor>>,
}

impl PredictorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_predictor(mut self, branch: impl Into<String>, predictor: Arc<dyn Predictor>) -> Self {
        self.predictors.insert(branch.into(), predictor);
        self
    }

    /// Load every `*.json` model artifact in `dir`. Artifacts that fail to
    /// parse are logged and skipped; an empty result is an error.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut registry = Self::new();
        let entries = fs::read_dir(dir).map_err(|e| {
            MovecastError::Config(format!("Cannot read model directory {}: {}", dir.display(), e))
        })?;

        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::load_model(&path) {
                Ok(model) => {
                    info!(branch = %model.branch, path = %path.display(), "Loaded model for {}", model.branch);
                    let branch = model.branch.clone();
                    registry.predictors.insert(branch, Arc::new(model));
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Error loading model artifact");
                }
            }
        }

        if registry.is_empty() {
            return Err(MovecastError::Config(format!(
                "No models loaded from {}",
                dir.display()
            )));
        }
        info!(models = registry.len(), "Loaded {} branch models", registry.len());
        Ok(registry)
    }

    fn load_model(path: &Path) -> Result<SeasonalTrendModel> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn get(&self, branch: &str) -> Option<Arc<dyn Predictor>> {
        self.predictors.get(branch).cloned()
    }

    pub fn branches(&self) -> Vec<String> {
        let mut branches: Vec<String> = self.predictors.keys().cloned().collect();
        branches.sort();
        branches
    }

    pub fn len(&self) -> usize {
        self.predictors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictors.is_empty()
    }
}
