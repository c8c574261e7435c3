//! Core traits for perceptron training engines

use crate::core::{Prediction, Result, Solution};
use crate::data::Point;
use num_traits::Float;

/// Numeric feature scalar accepted by the training engines
///
/// The engines accumulate in `f64` regardless of the feature representation,
/// so any float type with a lossless widening conversion qualifies.
pub trait Scalar: Float + Into<f64> + std::fmt::Debug + 'static {}

impl<T> Scalar for T where T: Float + Into<f64> + std::fmt::Debug + 'static {}

/// Common surface of the four training engine variants
///
/// `train()` mutates the engine's solution state in place until a sweep
/// commits zero updates (convergence, `Ok(true)`) or a sweep/update/time
/// budget fires (`Ok(false)`, partial but valid solution).
pub trait Classifier<T: Scalar> {
    /// Run the mistake-driven loop; true iff an error-free sweep was reached
    fn train(&mut self) -> Result<bool>;

    /// Decision value for a query point
    ///
    /// With `raw_value` the uninterpreted decision function value is
    /// returned; otherwise the discrete label relative to the learned
    /// margin threshold.
    fn evaluate(&self, point: &Point<T>, raw_value: bool) -> Result<f64>;

    /// The solution state produced by the last `train()` call
    fn solution(&self) -> &Solution;

    /// Label and raw decision value in one call
    fn predict(&self, point: &Point<T>) -> Result<Prediction> {
        let decision_value = self.evaluate(point, true)?;
        let label = self.evaluate(point, false)?;
        Ok(Prediction::new(label, decision_value))
    }
}
