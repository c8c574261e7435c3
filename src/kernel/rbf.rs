//! RBF (Radial Basis Function) kernel implementation
//!
//! The RBF kernel is defined as: K(x, y) = exp(-γ * ||x - y||²)
//! where γ (gamma) controls the kernel width.

use crate::core::Scalar;
use crate::kernel::Kernel;
use crate::utils::squared_distance;

/// RBF (Radial Basis Function) kernel: K(x, y) = exp(-γ * ||x - y||²)
///
/// The gamma parameter controls the "reach" of each training example:
/// - High gamma: close points have high influence (potential overfitting)
/// - Low gamma: distant points have influence (potential underfitting)
#[derive(Debug, Clone, Copy)]
pub struct RBFKernel {
    gamma: f64,
}

impl RBFKernel {
    /// Create a new RBF kernel with specified gamma parameter
    ///
    /// # Panics
    /// Panics if gamma is not positive
    pub fn new(gamma: f64) -> Self {
        assert!(gamma > 0.0, "Gamma must be positive, got: {}", gamma);
        Self { gamma }
    }

    /// Create RBF kernel with gamma = 1.0 / n_features
    pub fn with_auto_gamma(n_features: usize) -> Self {
        assert!(n_features > 0, "Number of features must be positive");
        Self::new(1.0 / n_features as f64)
    }

    /// Create RBF kernel with gamma = 1.0 (unit gamma)
    pub fn unit_gamma() -> Self {
        Self::new(1.0)
    }

    /// Get the gamma parameter
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for RBFKernel {
    /// Default RBF kernel with gamma = 1.0
    fn default() -> Self {
        Self::unit_gamma()
    }
}

impl<T: Scalar> Kernel<T> for RBFKernel {
    fn compute(&self, x: &[T], y: &[T]) -> f64 {
        (-self.gamma * squared_distance(x, y)).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rbf_kernel_identical_points() {
        let kernel = RBFKernel::unit_gamma();
        let x = vec![1.0, 2.0, 3.0];

        // K(x, x) = exp(0) = 1
        assert_relative_eq!(kernel.compute(&x, &x), 1.0);
    }

    #[test]
    fn test_rbf_kernel_distance_decay() {
        let kernel = RBFKernel::new(1.0);
        let x = vec![0.0, 0.0];
        let near = vec![0.1, 0.0];
        let far = vec![2.0, 0.0];

        let k_near = kernel.compute(&x, &near);
        let k_far = kernel.compute(&x, &far);

        assert!(k_near > k_far);
        assert_relative_eq!(k_far, (-4.0_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_rbf_kernel_gamma_effect() {
        let tight = RBFKernel::new(10.0);
        let wide = RBFKernel::new(0.1);
        let x = vec![0.0];
        let y = vec![1.0];

        assert!(tight.compute(&x, &y) < wide.compute(&x, &y));
    }

    #[test]
    fn test_rbf_kernel_auto_gamma() {
        let kernel = RBFKernel::with_auto_gamma(4);
        assert_relative_eq!(kernel.gamma(), 0.25);
    }

    #[test]
    #[should_panic(expected = "Gamma must be positive")]
    fn test_rbf_kernel_invalid_gamma() {
        RBFKernel::new(0.0);
    }
}
