//! Dual perceptron training engines
//!
//! Both engines operate on dual coefficients against a precomputed Gram
//! matrix. The plain variant defaults to a linear kernel and is then
//! exactly equivalent to [`PerceptronPrimal`] in mistake sequence and
//! reconstructed weights; the fixed-margin variant takes its kernel at
//! construction and maintains the per-point decision cache incrementally.
//!
//! [`PerceptronPrimal`]: crate::perceptron::PerceptronPrimal

use crate::core::{
    Classifier, PerceptronError, Result, Scalar, Solution, StopReason, TrainConfig,
};
use crate::data::{Point, SampleSet, SharedSampleSet};
use crate::kernel::{GramMatrix, Kernel};
use crate::perceptron::validate_labels;
use crate::utils::Stopwatch;
use log::{debug, info};

/// Decision function of a dual solution, through the kernel
///
/// `f = bias + Σ_r alpha[r]·y[r]·K(x_r, query)`. The reconstructed primal
/// weights are never consulted here; for non-linear kernels they are only
/// a diagnostic.
pub(crate) fn evaluate_dual<T: Scalar>(
    solution: &Solution,
    gram: &GramMatrix<T>,
    samples: &SampleSet<T>,
    point: &Point<T>,
    raw_value: bool,
) -> Result<f64> {
    if point.dim() != samples.dim() {
        return Err(PerceptronError::DimensionMismatch {
            expected: samples.dim(),
            actual: point.dim(),
        });
    }

    let mut f = solution.bias;
    for (stored, &alpha) in samples.points().iter().zip(&solution.alpha) {
        if alpha != 0.0 {
            f += alpha * stored.label() * gram.eval(stored.features(), point.features());
        }
    }
    if raw_value {
        Ok(f)
    } else if f > solution.margin * solution.norm {
        Ok(1.0)
    } else {
        Ok(-1.0)
    }
}

/// Primal weight vector implied by the dual coefficients
///
/// Exact for the linear kernel, diagnostic for any other.
fn reconstruct_weights<T: Scalar>(
    samples: &SampleSet<T>,
    alpha: &[f64],
    labels: &[f64],
) -> Vec<f64> {
    let mut w = vec![0.0; samples.dim()];
    for (r, point) in samples.points().iter().enumerate() {
        let coeff = alpha[r] * labels[r];
        if coeff != 0.0 {
            for (wd, &xd) in w.iter_mut().zip(point.features()) {
                *wd += coeff * xd.into();
            }
        }
    }
    w
}

/// Full quadratic form `sqrt(Σ_ij alpha_i·y_i·alpha_j·y_j·K_ij)`
///
/// Only evaluated once per training run, to seed the incremental norm
/// when resuming from non-zero dual coefficients.
fn dual_norm_from_scratch<T: Scalar>(gram: &GramMatrix<T>, alpha: &[f64], labels: &[f64]) -> f64 {
    let mut sq = 0.0;
    for i in 0..alpha.len() {
        if alpha[i] == 0.0 {
            continue;
        }
        for j in 0..alpha.len() {
            sq += alpha[i] * labels[i] * alpha[j] * labels[j] * gram.get(i, j);
        }
    }
    sq.max(0.0).sqrt()
}

/// Plain dual perceptron, optionally kernelized
///
/// Without an explicit kernel the Gram matrix is built from plain dot
/// products, making this the dual rendition of the plain primal engine.
pub struct PerceptronDual<T: Scalar> {
    samples: SharedSampleSet<T>,
    gram: GramMatrix<T>,
    config: TrainConfig,
    solution: Solution,
    timer: Stopwatch,
    sweeps: usize,
    updates: usize,
    stop: Option<StopReason>,
}

impl<T: Scalar> PerceptronDual<T> {
    /// Create an engine over the linear kernel
    pub fn new(samples: SharedSampleSet<T>) -> Self {
        Self::with_config(samples, TrainConfig::default())
    }

    /// Create an engine with an explicit configuration
    pub fn with_config(samples: SharedSampleSet<T>, config: TrainConfig) -> Self {
        Self {
            samples,
            gram: GramMatrix::linear(),
            config,
            solution: Solution::new(),
            timer: Stopwatch::new(),
            sweeps: 0,
            updates: 0,
            stop: None,
        }
    }

    /// Replace the kernel; the Gram matrix is rebuilt on the next `train`
    pub fn with_kernel<K: Kernel<T> + 'static>(mut self, kernel: K) -> Self {
        self.gram = GramMatrix::new(kernel);
        self
    }

    /// Set the learning rate
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.config.rate = rate;
        self
    }

    /// Set the maximum number of sweeps
    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.config.max_sweeps = max_sweeps;
        self
    }

    /// Set the maximum cumulative number of updates
    pub fn with_max_updates(mut self, max_updates: usize) -> Self {
        self.config.max_updates = max_updates;
        self
    }

    /// Set the wall-clock budget
    pub fn with_max_time(mut self, max_time: std::time::Duration) -> Self {
        self.config.max_time = max_time;
        self
    }

    /// Seed training from a previously obtained solution
    pub fn with_initial_solution(mut self, solution: Solution) -> Self {
        self.solution = solution;
        self
    }

    /// Engine configuration
    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Sweeps performed by the last training run
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    /// Updates committed by the last training run
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// Terminal state of the last training run
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }
}

impl<T: Scalar> Classifier<T> for PerceptronDual<T> {
    fn train(&mut self) -> Result<bool> {
        self.config.validate()?;
        let size = self.samples.borrow().len();
        if size == 0 {
            return Err(PerceptronError::EmptySampleSet);
        }
        validate_labels(&self.samples.borrow())?;
        self.gram.compute(&self.samples.borrow())?;

        let labels = self.samples.borrow().labels();
        let mut alpha = if self.solution.alpha.is_empty() {
            self.samples.borrow().alphas()
        } else if self.solution.alpha.len() == size {
            std::mem::take(&mut self.solution.alpha)
        } else {
            return Err(PerceptronError::DimensionMismatch {
                expected: size,
                actual: self.solution.alpha.len(),
            });
        };
        let mut bias = self.solution.bias;
        let mut norm = if alpha.iter().any(|&a| a != 0.0) {
            dual_norm_from_scratch(&self.gram, &alpha, &labels)
        } else {
            0.0
        };

        let rate = self.config.rate;
        let index = self.samples.borrow().index().to_vec();
        self.sweeps = 0;
        self.updates = 0;
        self.stop = None;
        self.timer.reset();

        loop {
            // budget is polled once per sweep; in-flight updates complete
            if self.timer.elapsed() >= self.config.max_time {
                self.stop = Some(StopReason::TimeLimit);
                break;
            }

            let mut mistakes = 0_usize;
            for &idx in &index {
                let y = labels[idx];
                let mut f = bias;
                for r in 0..size {
                    if alpha[r] != 0.0 {
                        f += alpha[r] * labels[r] * self.gram.get(idx, r);
                    }
                }

                if y * f <= 0.0 {
                    // closed-form expansion of the quadratic form avoids
                    // recomputing it after every correction
                    norm = (norm * norm
                        + 2.0 * rate * y * (f - bias)
                        + rate * rate * self.gram.diag(idx))
                    .max(0.0)
                    .sqrt();
                    alpha[idx] += rate;
                    bias += rate * y;
                    self.updates += 1;
                    mistakes += 1;
                } else if self.sweeps > 0 && mistakes > 1 {
                    break;
                }
            }
            self.sweeps += 1;
            debug!(
                "dual sweep {}: {} mistakes, norm {:.6}",
                self.sweeps, mistakes, norm
            );

            if !norm.is_finite() || !bias.is_finite() {
                return Err(PerceptronError::NonFiniteValue { sweep: self.sweeps });
            }
            if mistakes == 0 {
                self.stop = Some(StopReason::Converged);
                break;
            }
            if self.sweeps >= self.config.max_sweeps {
                self.stop = Some(StopReason::SweepLimit);
                break;
            }
            if self.updates >= self.config.max_updates {
                self.stop = Some(StopReason::UpdateLimit);
                break;
            }
        }

        {
            let mut smp = self.samples.borrow_mut();
            for (r, &a) in alpha.iter().enumerate() {
                smp.set_alpha(r, a);
            }
        }
        self.solution.w = reconstruct_weights(&self.samples.borrow(), &alpha, &labels);
        self.solution.alpha = alpha;
        self.solution.bias = bias;
        self.solution.norm = norm;
        self.solution.margin = 0.0;

        let converged = matches!(self.stop, Some(StopReason::Converged));
        info!(
            "dual perceptron stopped ({:?}) after {} sweeps, {} updates",
            self.stop, self.sweeps, self.updates
        );
        Ok(converged)
    }

    fn evaluate(&self, point: &Point<T>, raw_value: bool) -> Result<f64> {
        evaluate_dual(
            &self.solution,
            &self.gram,
            &self.samples.borrow(),
            point,
            raw_value,
        )
    }

    fn solution(&self) -> &Solution {
        &self.solution
    }
}

/// Fixed-margin dual perceptron
///
/// Margin and slack mechanics of the fixed-margin primal engine, carried
/// out in the dual. A mistaken point rescales every dual weight by
/// `λ = 1 − rate·γ/norm` and the cached decision values are advanced in
/// closed form, `func[r] = λ·func[r] + rate·y·(K[idx][r] + 1) + bias·(1−λ)`,
/// where the `+1` carries the bias correction through the kernel sum.
///
/// The kernel is part of the constructor signature; there is no unkernelized
/// state to misuse.
pub struct PerceptronFixedMarginDual<T: Scalar> {
    samples: SharedSampleSet<T>,
    gram: GramMatrix<T>,
    config: TrainConfig,
    solution: Solution,
    timer: Stopwatch,
    sweeps: usize,
    updates: usize,
    stop: Option<StopReason>,
}

impl<T: Scalar> PerceptronFixedMarginDual<T> {
    /// Create an engine over the given kernel with margin `gamma`
    pub fn new<K: Kernel<T> + 'static>(samples: SharedSampleSet<T>, kernel: K, gamma: f64) -> Self {
        let config = TrainConfig {
            gamma,
            ..TrainConfig::default()
        };
        Self {
            samples,
            gram: GramMatrix::new(kernel),
            config,
            solution: Solution::new(),
            timer: Stopwatch::new(),
            sweeps: 0,
            updates: 0,
            stop: None,
        }
    }

    /// Set the learning rate
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.config.rate = rate;
        self
    }

    /// Set the required margin fraction
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.config.gamma = gamma;
        self
    }

    /// Set the slack coefficient
    pub fn with_flexible(mut self, flexible: f64) -> Self {
        self.config.flexible = flexible;
        self
    }

    /// Set the maximum number of sweeps
    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.config.max_sweeps = max_sweeps;
        self
    }

    /// Set the maximum cumulative number of updates
    pub fn with_max_updates(mut self, max_updates: usize) -> Self {
        self.config.max_updates = max_updates;
        self
    }

    /// Set the wall-clock budget
    pub fn with_max_time(mut self, max_time: std::time::Duration) -> Self {
        self.config.max_time = max_time;
        self
    }

    /// Seed training from a previously obtained solution
    pub fn with_initial_solution(mut self, solution: Solution) -> Self {
        self.solution = solution;
        self
    }

    /// Engine configuration
    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Sweeps performed by the last training run
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    /// Updates committed by the last training run
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// Terminal state of the last training run
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }
}

impl<T: Scalar> Classifier<T> for PerceptronFixedMarginDual<T> {
    fn train(&mut self) -> Result<bool> {
        self.config.validate()?;
        let size = self.samples.borrow().len();
        if size == 0 {
            return Err(PerceptronError::EmptySampleSet);
        }
        validate_labels(&self.samples.borrow())?;
        self.gram.compute(&self.samples.borrow())?;

        let labels = self.samples.borrow().labels();
        let mut bias = self.solution.bias;
        let mut norm = self.solution.norm;
        if norm == 0.0 {
            let alpha = self.samples.borrow().alphas();
            if alpha.iter().any(|&a| a != 0.0) {
                // resuming from non-zero dual weights without a norm
                norm = dual_norm_from_scratch(&self.gram, &alpha, &labels);
            }
        }
        if !self.solution.func.is_empty() && self.solution.func.len() != size {
            return Err(PerceptronError::DimensionMismatch {
                expected: size,
                actual: self.solution.func.len(),
            });
        }
        let mut func = std::mem::take(&mut self.solution.func);
        if func.is_empty() {
            // seed the cache from whatever dual weights the store carries
            let alpha = self.samples.borrow().alphas();
            func = (0..size)
                .map(|r| {
                    let mut f = bias;
                    for j in 0..size {
                        if alpha[j] != 0.0 {
                            f += alpha[j] * labels[j] * self.gram.get(j, r);
                        }
                    }
                    f
                })
                .collect();
        }

        let rate = self.config.rate;
        let gamma = self.config.gamma;
        let flexible = self.config.flexible;
        let mut index = self.samples.borrow().index().to_vec();
        let mut partition = 0_usize;
        self.sweeps = 0;
        self.updates = 0;
        self.stop = None;
        self.timer.reset();

        loop {
            if self.timer.elapsed() >= self.config.max_time {
                self.stop = Some(StopReason::TimeLimit);
                break;
            }

            let mut mistakes = 0_usize;
            for i in 0..size {
                let idx = index[i];
                let y = labels[idx];
                let alpha_idx = self.samples.borrow().alpha(idx);

                if y * func[idx] <= gamma * norm - alpha_idx * flexible {
                    let lambda = if norm != 0.0 {
                        1.0 - rate * gamma / norm
                    } else {
                        1.0
                    };
                    let f_old = func[idx];
                    {
                        let mut smp = self.samples.borrow_mut();
                        smp.scale_alphas(lambda);
                        let a = smp.alpha(idx);
                        smp.set_alpha(idx, a + rate);
                    }

                    norm = (lambda * lambda * norm * norm
                        + 2.0 * lambda * rate * y * (f_old - bias)
                        + rate * rate * self.gram.diag(idx))
                    .max(0.0)
                    .sqrt();
                    for r in 0..size {
                        func[r] = lambda * func[r]
                            + rate * y * (self.gram.get(idx, r) + 1.0)
                            + bias * (1.0 - lambda);
                    }
                    bias += rate * y;

                    // swap the mistaken point into the front partition
                    let k = if i > partition {
                        partition += 1;
                        partition
                    } else {
                        mistakes
                    };
                    index.swap(k, i);
                    self.updates += 1;
                    mistakes += 1;
                } else if self.sweeps > 0 && mistakes > 1 && i > partition {
                    break;
                }
            }
            self.sweeps += 1;
            debug!(
                "fixed-margin dual sweep {}: {} mistakes, norm {:.6}",
                self.sweeps, mistakes, norm
            );

            if !norm.is_finite() || !bias.is_finite() || func.iter().any(|f| !f.is_finite()) {
                return Err(PerceptronError::NonFiniteValue { sweep: self.sweeps });
            }
            if mistakes == 0 {
                self.stop = Some(StopReason::Converged);
                break;
            }
            if self.sweeps >= self.config.max_sweeps {
                self.stop = Some(StopReason::SweepLimit);
                break;
            }
            if self.updates >= self.config.max_updates {
                self.stop = Some(StopReason::UpdateLimit);
                break;
            }
        }

        let alpha = self.samples.borrow().alphas();
        self.solution.w = reconstruct_weights(&self.samples.borrow(), &alpha, &labels);
        self.solution.alpha = alpha;
        self.solution.bias = bias;
        self.solution.norm = norm;
        self.solution.func = func;
        self.solution.margin = gamma;
        self.samples.borrow_mut().set_index(index)?;

        let converged = matches!(self.stop, Some(StopReason::Converged));
        info!(
            "fixed-margin dual perceptron stopped ({:?}) after {} sweeps, {} updates",
            self.stop, self.sweeps, self.updates
        );
        Ok(converged)
    }

    fn evaluate(&self, point: &Point<T>, raw_value: bool) -> Result<f64> {
        evaluate_dual(
            &self.solution,
            &self.gram,
            &self.samples.borrow(),
            point,
            raw_value,
        )
    }

    fn solution(&self) -> &Solution {
        &self.solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SampleSet;
    use crate::kernel::RBFKernel;
    use crate::perceptron::PerceptronPrimal;
    use crate::utils::euclidean_norm;
    use approx::assert_relative_eq;
    use std::time::Duration;

    fn separable_set() -> SharedSampleSet<f64> {
        SampleSet::from_points(vec![
            Point::new(vec![1.0, 1.0], 1.0),
            Point::new(vec![2.0, 2.0], 1.0),
            Point::new(vec![-1.0, -1.0], -1.0),
            Point::new(vec![-2.0, -2.0], -1.0),
        ])
        .expect("valid points")
        .into_shared()
    }

    fn xor_set() -> SharedSampleSet<f64> {
        SampleSet::from_points(vec![
            Point::new(vec![0.0, 0.0], -1.0),
            Point::new(vec![1.0, 1.0], -1.0),
            Point::new(vec![1.0, 0.0], 1.0),
            Point::new(vec![0.0, 1.0], 1.0),
        ])
        .expect("valid points")
        .into_shared()
    }

    #[test]
    fn test_dual_converges_on_separable_set() {
        let mut engine = PerceptronDual::new(separable_set()).with_rate(1.0);
        let converged = engine.train().expect("training should succeed");

        assert!(converged);
        assert_eq!(engine.stop_reason(), Some(StopReason::Converged));
        assert!(engine.updates() > 0);
        assert!(engine.solution().is_finite());
    }

    #[test]
    fn test_dual_matches_primal_on_linear_kernel() {
        let mut primal = PerceptronPrimal::new(separable_set()).with_rate(0.5);
        let mut dual = PerceptronDual::new(separable_set()).with_rate(0.5);
        assert!(primal.train().expect("training should succeed"));
        assert!(dual.train().expect("training should succeed"));

        // identical mistake sequences, so identical weights and bias
        assert_eq!(primal.updates(), dual.updates());
        assert_relative_eq!(primal.solution().bias, dual.solution().bias, epsilon = 1e-10);
        for (pw, dw) in primal.solution().w.iter().zip(&dual.solution().w) {
            assert_relative_eq!(pw, dw, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_dual_norm_matches_reconstruction() {
        let mut engine = PerceptronDual::new(separable_set()).with_rate(1.0);
        assert!(engine.train().expect("training should succeed"));

        // for the linear kernel the incremental norm is exactly ||w||
        let solution = engine.solution();
        assert_relative_eq!(
            solution.norm,
            euclidean_norm(&solution.w),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_dual_writes_alphas_to_store() {
        let samples = separable_set();
        let mut engine = PerceptronDual::new(samples.clone()).with_rate(1.0);
        assert!(engine.train().expect("training should succeed"));

        assert_eq!(engine.solution().alpha, samples.borrow().alphas());
        assert!(engine.solution().alpha.iter().sum::<f64>() > 0.0);
    }

    #[test]
    fn test_dual_predictions_go_through_kernel() {
        let mut engine = PerceptronDual::new(separable_set()).with_rate(1.0);
        assert!(engine.train().expect("training should succeed"));

        let pos = Point::new(vec![0.5, 0.5], 1.0);
        let neg = Point::new(vec![-0.5, -0.5], -1.0);
        assert_eq!(engine.evaluate(&pos, false).unwrap(), 1.0);
        assert_eq!(engine.evaluate(&neg, false).unwrap(), -1.0);
    }

    #[test]
    fn test_dual_evaluate_rejects_dimension_mismatch() {
        let engine = PerceptronDual::new(separable_set());
        let query = Point::new(vec![1.0], 1.0);
        assert!(matches!(
            engine.evaluate(&query, true),
            Err(PerceptronError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_dual_timeout_returns_false() {
        let mut engine = PerceptronDual::new(separable_set())
            .with_rate(1.0)
            .with_max_time(Duration::ZERO);
        let converged = engine.train().expect("training should succeed");

        assert!(!converged);
        assert_eq!(engine.stop_reason(), Some(StopReason::TimeLimit));
        assert_eq!(engine.updates(), 0);
    }

    #[test]
    fn test_fixed_dual_solves_xor_with_rbf() {
        let samples = xor_set();
        let mut engine =
            PerceptronFixedMarginDual::new(samples.clone(), RBFKernel::unit_gamma(), 0.0)
                .with_rate(0.5);
        let converged = engine.train().expect("training should succeed");
        assert!(converged);

        // all four training points classified correctly, which no linear
        // separator can do
        for point in samples.borrow().points() {
            let label = engine.evaluate(point, false).expect("evaluate");
            assert_eq!(label, point.label());
        }
    }

    #[test]
    fn test_fixed_dual_cache_consistent_with_kernel_sum() {
        let samples = xor_set();
        let mut engine =
            PerceptronFixedMarginDual::new(samples.clone(), RBFKernel::unit_gamma(), 0.0)
                .with_rate(0.5);
        assert!(engine.train().expect("training should succeed"));

        // the incrementally maintained cache must agree with a from-scratch
        // kernel evaluation at every stored point
        for (r, point) in samples.borrow().points().iter().enumerate() {
            let f = engine.evaluate(point, true).expect("evaluate");
            assert_relative_eq!(engine.solution().func[r], f, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_fixed_dual_maintains_index_permutation() {
        let samples = xor_set();
        let mut engine =
            PerceptronFixedMarginDual::new(samples.clone(), RBFKernel::unit_gamma(), 0.0)
                .with_rate(0.5);
        engine.train().expect("training should succeed");

        let smp = samples.borrow();
        let mut seen = vec![false; smp.len()];
        for &i in smp.index() {
            assert!(!seen[i]);
            seen[i] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_fixed_dual_margin_decays_alphas() {
        let samples = separable_set();
        let mut engine = PerceptronFixedMarginDual::new(
            samples.clone(),
            crate::kernel::LinearKernel::new(),
            0.1,
        )
        .with_rate(0.5);
        assert!(engine.train().expect("training should succeed"));

        assert_relative_eq!(engine.solution().margin, 0.1);
        assert!(engine.solution().norm > 0.0);
        assert_eq!(engine.solution().alpha, samples.borrow().alphas());
    }

    #[test]
    fn test_fixed_dual_timeout_returns_false() {
        let mut engine =
            PerceptronFixedMarginDual::new(xor_set(), RBFKernel::unit_gamma(), 0.0)
                .with_max_time(Duration::ZERO);
        let converged = engine.train().expect("training should succeed");

        assert!(!converged);
        assert_eq!(engine.stop_reason(), Some(StopReason::TimeLimit));
        assert_eq!(engine.solution().func.len(), 4);
    }
}
