//! Kernel trait definition

use crate::core::Scalar;

/// Kernel function trait
///
/// A kernel function K(x, y) must satisfy Mercer's condition to induce a
/// valid Gram matrix. Implementations operate on dense feature slices of
/// equal length; the [`GramMatrix`](crate::kernel::GramMatrix) evaluator
/// guarantees that for stored points.
pub trait Kernel<T: Scalar> {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: &[T], y: &[T]) -> f64;
}
