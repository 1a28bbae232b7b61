//! Error types for Descenso

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Empty batch: training requires at least one sample")]
    EmptyBatch,

    #[error("Non-finite loss at epoch {epoch}: {loss}")]
    NonFiniteLoss { epoch: usize, loss: f32 },

    #[error("Unknown label: {0:?}")]
    UnknownLabel(String),

    #[error("Missing column: {0:?}")]
    MissingColumn(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Plot error: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, Error>;
