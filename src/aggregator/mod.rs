//! Offline seasonal percentage precomputation

pub mod checkpoint;
pub mod combinations;
pub mod grouping;
pub mod pipeline;

pub use checkpoint::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
pub use combinations::CombinationSpace;
pub use grouping::GroupedVolumes;
pub use pipeline::{evaluate, CombinationFailure, Outcome, PercentageAggregator, RunSummary};
