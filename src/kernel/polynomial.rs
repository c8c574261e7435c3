//! Polynomial kernel implementation
//!
//! K(x, y) = (γ * <x, y> + r)^d
//!
//! Common configurations:
//! - Linear kernel: d=1, γ=1, r=0
//! - Quadratic kernel: d=2, γ=1, r=1
//! - Cubic kernel: d=3, γ=1, r=1

use crate::core::Scalar;
use crate::kernel::Kernel;
use crate::utils::dot_features;

/// Polynomial kernel with configurable degree, gamma, and coefficient
#[derive(Debug, Clone)]
pub struct PolynomialKernel {
    /// Scaling factor for the dot product (default: 1.0)
    pub gamma: f64,
    /// Independent term in the polynomial (default: 1.0)
    pub coef0: f64,
    /// Degree of the polynomial (default: 3)
    pub degree: u32,
}

impl PolynomialKernel {
    /// Creates a new polynomial kernel with the specified parameters
    ///
    /// # Panics
    /// Panics if degree is zero or gamma is not positive
    pub fn new(degree: u32, gamma: f64, coef0: f64) -> Self {
        assert!(degree > 0, "Polynomial degree must be positive");
        assert!(gamma > 0.0, "Gamma must be positive");

        Self {
            gamma,
            coef0,
            degree,
        }
    }

    /// Creates a quadratic kernel: (γ * <x,y> + 1)²
    pub fn quadratic(gamma: f64) -> Self {
        Self::new(2, gamma, 1.0)
    }

    /// Creates a cubic kernel: (γ * <x,y> + 1)³
    pub fn cubic(gamma: f64) -> Self {
        Self::new(3, gamma, 1.0)
    }
}

impl Default for PolynomialKernel {
    /// Default cubic kernel: (x·y + 1)³
    fn default() -> Self {
        Self::new(3, 1.0, 1.0)
    }
}

impl<T: Scalar> Kernel<T> for PolynomialKernel {
    fn compute(&self, x: &[T], y: &[T]) -> f64 {
        let dot = dot_features(x, y);
        (self.gamma * dot + self.coef0).powi(self.degree as i32)
    }
}
