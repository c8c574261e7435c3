//! Linear kernel implementation

use crate::core::Scalar;
use crate::kernel::Kernel;
use crate::utils::dot_features;

/// Linear kernel: K(x, y) = x^T * y
///
/// The identity kernel of the dual perceptron: with it, the reconstructed
/// primal weight vector is an exact representation of the learned
/// decision function.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearKernel;

impl LinearKernel {
    /// Create a new linear kernel
    pub fn new() -> Self {
        Self
    }
}

impl<T: Scalar> Kernel<T> for LinearKernel {
    fn compute(&self, x: &[T], y: &[T]) -> f64 {
        dot_features(x, y)
    }
}
