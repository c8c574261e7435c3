//! Gram matrix evaluator for the dual training engines
//!
//! Computes and caches the symmetric matrix of pairwise kernel values over a
//! sample store. The matrix is rebuilt by [`GramMatrix::compute`] at the
//! start of each dual training run and treated as read-only for the
//! duration of the optimization loop. It is indexed by store position; the
//! store's permutation index is used to read it, never to reorder it.

use crate::core::{PerceptronError, Result, Scalar};
use crate::data::SampleSet;
use crate::kernel::{Kernel, LinearKernel};

/// Kernel evaluator owning a kernel function and its cached Gram matrix
pub struct GramMatrix<T: Scalar> {
    kernel: Box<dyn Kernel<T>>,
    matrix: Vec<Vec<f64>>,
}

impl<T: Scalar> GramMatrix<T> {
    /// Create an evaluator for the given kernel; the matrix starts empty
    pub fn new<K: Kernel<T> + 'static>(kernel: K) -> Self {
        Self {
            kernel: Box::new(kernel),
            matrix: Vec::new(),
        }
    }

    /// Evaluator for the linear (identity) kernel
    pub fn linear() -> Self {
        Self::new(LinearKernel::new())
    }

    /// Rebuild the Gram matrix over the current store order
    ///
    /// Only the lower triangle is evaluated; the upper triangle is mirrored
    /// from symmetry.
    pub fn compute(&mut self, samples: &SampleSet<T>) -> Result<()> {
        let n = samples.len();
        if n == 0 {
            return Err(PerceptronError::EmptySampleSet);
        }

        self.matrix = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..=i {
                let value = self
                    .kernel
                    .compute(samples.point(i).features(), samples.point(j).features());
                self.matrix[i][j] = value;
                self.matrix[j][i] = value;
            }
        }
        Ok(())
    }

    /// Kernel value between two stored points, by store position
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.matrix[i][j]
    }

    /// Diagonal entry K(i, i)
    pub fn diag(&self, i: usize) -> f64 {
        self.matrix[i][i]
    }

    /// Number of rows of the cached matrix; zero before the first `compute`
    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    /// Whether `compute` has been invoked yet
    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// Kernel value between arbitrary feature slices (evaluation path)
    pub fn eval(&self, x: &[T], y: &[T]) -> f64 {
        self.kernel.compute(x, y)
    }
}

impl<T: Scalar> std::fmt::Debug for GramMatrix<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GramMatrix")
            .field("rows", &self.matrix.len())
            .finish()
    }
}
