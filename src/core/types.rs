//! Core type definitions for perceptron training

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Prediction result containing label and decision value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label (+1 or -1)
    pub label: f64,
    /// Raw decision function value
    pub decision_value: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: f64, decision_value: f64) -> Self {
        Self {
            label,
            decision_value,
        }
    }

    /// Get confidence as absolute value of decision value
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }
}

/// Mutable optimization state shared by all training engine variants
///
/// `w` holds the primal weight vector, `alpha` the dual coefficients and
/// `func` the cached per-point decision values maintained by the fixed-margin
/// variants. `norm` is the regularization norm of `w` (or its dual surrogate)
/// and is consistent with the weights whenever `train()` has returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Primal weight vector (length = feature dimension)
    pub w: Vec<f64>,
    /// Bias term
    pub bias: f64,
    /// Regularization norm of the weight vector
    pub norm: f64,
    /// Dual coefficients (length = sample count, dual variants)
    pub alpha: Vec<f64>,
    /// Cached per-point decision values (fixed-margin variants)
    pub func: Vec<f64>,
    /// Margin threshold applied at evaluation time
    pub margin: f64,
}

impl Solution {
    /// Create an empty solution; vectors are lazily sized on first training
    pub fn new() -> Self {
        Self::default()
    }

    /// Feature dimension of the learned weight vector
    pub fn dim(&self) -> usize {
        self.w.len()
    }

    /// Check that every scalar and vector entry is finite
    pub fn is_finite(&self) -> bool {
        self.bias.is_finite()
            && self.norm.is_finite()
            && self.margin.is_finite()
            && self.w.iter().all(|v| v.is_finite())
            && self.alpha.iter().all(|v| v.is_finite())
            && self.func.iter().all(|v| v.is_finite())
    }
}

/// Configuration shared by all training engine variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Learning rate applied on every mistake
    pub rate: f64,
    /// Regularization exponent selecting the norm update rule
    /// (fixed-margin primal only; see `PerceptronFixedMarginPrimal`)
    pub q: f64,
    /// Required margin as a fraction of the current norm
    pub gamma: f64,
    /// Slack coefficient scaling the per-point tolerance
    pub flexible: f64,
    /// Maximum number of full sweeps over the sample set
    pub max_sweeps: usize,
    /// Maximum cumulative number of mistake-driven updates
    pub max_updates: usize,
    /// Wall-clock budget, polled once per sweep
    pub max_time: Duration,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            rate: 0.5,
            q: 2.0,
            gamma: 0.0,
            flexible: 0.0,
            max_sweeps: 100_000,
            max_updates: 10_000_000,
            max_time: Duration::from_secs(100),
        }
    }
}

impl TrainConfig {
    /// Validate the configuration before training
    pub fn validate(&self) -> crate::core::Result<()> {
        use crate::core::PerceptronError;

        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(PerceptronError::InvalidParameter(format!(
                "learning rate must be positive, got {}",
                self.rate
            )));
        }
        if !self.gamma.is_finite() || self.gamma < 0.0 {
            return Err(PerceptronError::InvalidParameter(format!(
                "margin must be non-negative, got {}",
                self.gamma
            )));
        }
        if !self.flexible.is_finite() || self.flexible < 0.0 {
            return Err(PerceptronError::InvalidParameter(format!(
                "flexible slack must be non-negative, got {}",
                self.flexible
            )));
        }
        if self.q == 0.0 || !self.q.is_finite() {
            return Err(PerceptronError::InvalidParameter(format!(
                "regularization exponent must be finite and non-zero, got {}",
                self.q
            )));
        }
        Ok(())
    }
}

/// Terminal state of a training run
///
/// `Converged` means a full sweep committed zero updates; the other three are
/// the exhaustion conditions, which leave a valid partial solution behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Zero mistakes in a full sweep
    Converged,
    /// Sweep counter exceeded the configured maximum
    SweepLimit,
    /// Cumulative update counter exceeded the configured maximum
    UpdateLimit,
    /// Elapsed wall-clock time exceeded the budget
    TimeLimit,
}

impl StopReason {
    /// Whether the run ended by reaching an error-free sweep
    pub fn is_converged(&self) -> bool {
        matches!(self, StopReason::Converged)
    }
}
