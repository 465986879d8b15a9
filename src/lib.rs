//! Movecast: seasonal move-volume percentages and blended category forecasts

pub mod aggregator;
pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod forecast;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod models;
