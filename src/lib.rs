//! Rust implementation of margin perceptron training engines
//!
//! Mistake-driven optimizers in primal and dual form, with fixed-margin
//! variants covering the L1/L2/L∞/general-Lp regularization family and
//! kernelized training over a cached Gram matrix.

pub mod core;
pub mod data;
pub mod kernel;
pub mod perceptron;
pub mod persistence;
pub mod utils;

// Re-export main types for convenience
pub use crate::core::error::{PerceptronError, Result};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::data::{Point, SampleSet, SharedSampleSet};
pub use crate::kernel::{GramMatrix, Kernel, LinearKernel, PolynomialKernel, RBFKernel};
pub use crate::perceptron::{
    PerceptronDual, PerceptronFixedMarginDual, PerceptronFixedMarginPrimal, PerceptronPrimal,
};
pub use crate::persistence::{ModelMetadata, SavedModel};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
