//! Margin-perceptron training engines
//!
//! Four mistake-driven variants share one loop shape: scan the sample
//! store in permutation-index order, apply a correction whenever a point
//! violates its sign/margin condition, and stop when a full sweep commits
//! zero updates (converged) or a sweep/update/wall-clock budget fires
//! (exhausted; the partial solution stays valid and usable).
//!
//! - [`PerceptronPrimal`]: plain primal perceptron over an explicit weight
//!   vector.
//! - [`PerceptronFixedMarginPrimal`]: enforces a `γ·norm` margin with a
//!   per-point slack term and one of four norm update rules selected by
//!   the exponent `q`.
//! - [`PerceptronDual`]: dual-coefficient loop over a kernel Gram matrix,
//!   linear by default.
//! - [`PerceptronFixedMarginDual`]: margin/slack mechanics in the dual,
//!   with an incrementally maintained per-point decision cache.
//!
//! The fixed-margin variants reorder the permutation index in place,
//! swapping mistaken points into a front partition `[0, s)` so later
//! sweeps revisit recent mistakes first. This accelerates convergence but
//! is not required for correctness.

pub mod dual;
pub mod primal;

pub use self::dual::*;
pub use self::primal::*;

use crate::core::{PerceptronError, Result, Scalar};
use crate::data::SampleSet;

/// Training requires the two-class -1/+1 encoding
pub(crate) fn validate_labels<T: Scalar>(samples: &SampleSet<T>) -> Result<()> {
    for point in samples.points() {
        let y = point.label();
        if y != 1.0 && y != -1.0 {
            return Err(PerceptronError::InvalidLabel(y));
        }
    }
    Ok(())
}

/// Widen a feature slice into the f64 accumulator domain
pub(crate) fn widen_features<T: Scalar>(x: &[T]) -> Vec<f64> {
    x.iter().map(|&v| v.into()).collect()
}
