//! Error taxonomy shared by the aggregator, the blender and the transport

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MovecastError {
    /// Bad request input: malformed date, date past the horizon, unknown branch or category
    #[error("{0}")]
    Validation(String),

    /// No trained predictor is registered for the branch
    #[error("No pre-trained model for branch {0}")]
    ModelUnavailable(String),

    /// Empty or malformed source extract
    #[error("Data error: {0}")]
    Data(String),

    /// Lost connection, shutdown or resource exhaustion on the relational store
    #[error("Store unavailable: {0}")]
    TransientStore(String),

    /// Store rejected the statement: missing relation, permissions, type mismatch
    #[error("Store error: {0}")]
    Store(String),

    #[error("Interrupted before completion; rerun to resume from the checkpoint")]
    Interrupted,

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MovecastError {
    /// Whether the operation may succeed if simply tried again
    pub fn is_transient(&self) -> bool {
        matches!(self, MovecastError::TransientStore(_))
    }
}

/// SQLSTATE codes worth retrying: connection exceptions (class 08),
/// insufficient resources (class 53), shutdown (57P0x) and rolled-back
/// transactions from serialization failures or deadlocks.
pub fn is_transient_sqlstate(code: &str) -> bool {
    code.starts_with("08")
        || code.starts_with("53")
        || code.starts_with("57P0")
        || code == "40001"
        || code == "40P01"
}

impl From<tokio_postgres::Error> for MovecastError {
    fn from(err: tokio_postgres::Error) -> Self {
        let transient = err.is_closed()
            || err
                .code()
                .map(|state| is_transient_sqlstate(state.code()))
                .unwrap_or(false);
        if transient {
            MovecastError::TransientStore(err.to_string())
        } else {
            MovecastError::Store(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, MovecastError>;
