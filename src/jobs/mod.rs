//! Job queue system for scheduled percentage rebuilds

pub mod context;
pub mod handlers;
pub mod types;

pub use context::JobContext;
pub use types::RebuildPercentagesJob;
