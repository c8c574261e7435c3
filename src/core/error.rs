//! Error types for perceptron training and evaluation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PerceptronError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid label: expected -1 or +1, got {0}")]
    InvalidLabel(f64),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty sample set")]
    EmptySampleSet,

    #[error("Index is not a permutation of [0, {size})")]
    InvalidIndex { size: usize },

    #[error("Non-finite value encountered during sweep {sweep}")]
    NonFiniteValue { sweep: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, PerceptronError>;
