//! Primal perceptron training engines
//!
//! Both engines maintain an explicit weight vector. The plain variant
//! corrects sign mistakes only; the fixed-margin variant additionally
//! enforces a `γ·norm` margin under one of four regularization update
//! rules selected by the exponent `q`.

use crate::core::{
    Classifier, PerceptronError, Result, Scalar, Solution, StopReason, TrainConfig,
};
use crate::data::{Point, SharedSampleSet};
use crate::perceptron::{validate_labels, widen_features};
use crate::utils::{self, Stopwatch};
use log::{debug, info};

/// Relative tolerance deciding membership in the largest-magnitude
/// coordinate cluster of the `q = -1` update rule.
pub const CLUSTER_EPS: f64 = 1e-4;

/// Decision function of a primal solution
///
/// Fails fast when the query dimension differs from the learned weight
/// vector instead of degrading to a zero score.
pub(crate) fn evaluate_primal<T: Scalar>(
    solution: &Solution,
    point: &Point<T>,
    raw_value: bool,
) -> Result<f64> {
    let dim = solution.w.len();
    if point.dim() != dim {
        return Err(PerceptronError::DimensionMismatch {
            expected: dim,
            actual: point.dim(),
        });
    }

    let f = solution.bias + utils::dot(&solution.w, point.features());
    if raw_value {
        Ok(f)
    } else if f > solution.margin * solution.norm {
        Ok(1.0)
    } else {
        Ok(-1.0)
    }
}

/// Largest coordinate magnitude and the size of its tolerance cluster
///
/// Coordinates are scanned in ascending index order; a coordinate joins
/// the cluster when its magnitude is within `eps` relative tolerance of
/// the running maximum, and a strictly larger magnitude resets the
/// cluster to itself. An all-zero vector reports the full dimension as
/// the cluster, matching the untrained starting state.
fn max_abs_cluster(w: &[f64], eps: f64) -> (f64, usize) {
    let mut largest = 0.0_f64;
    let mut count = 0_usize;
    for wj in w {
        let m = wj.abs();
        if m > largest * (1.0 + eps) {
            largest = m;
            count = 1;
        } else if largest > 0.0 && (largest - m).abs() / largest < eps {
            count += 1;
        }
    }
    if largest == 0.0 {
        (0.0, w.len())
    } else {
        (largest, count)
    }
}

/// Plain primal perceptron
///
/// Sweeps the index order correcting every sign mistake with
/// `w += rate·y·x`, `bias += rate·y` until an error-free sweep or budget
/// exhaustion.
pub struct PerceptronPrimal<T: Scalar> {
    samples: SharedSampleSet<T>,
    config: TrainConfig,
    solution: Solution,
    timer: Stopwatch,
    sweeps: usize,
    updates: usize,
    stop: Option<StopReason>,
}

impl<T: Scalar> PerceptronPrimal<T> {
    /// Create an engine bound to a shared sample store
    pub fn new(samples: SharedSampleSet<T>) -> Self {
        Self::with_config(samples, TrainConfig::default())
    }

    /// Create an engine with an explicit configuration
    pub fn with_config(samples: SharedSampleSet<T>, config: TrainConfig) -> Self {
        Self {
            samples,
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

impl<T: Scalar> Classifier<T> for PerceptronPrimal<T> {
    fn train(&mut self) -> Result<bool> {
        self.config.validate()?;
        let (size, dim) = {
            let smp = self.samples.borrow();
            (smp.len(), smp.dim())
        };
        if size == 0 {
            return Err(PerceptronError::EmptySampleSet);
        }
        validate_labels(&self.samples.borrow())?;

        if self.solution.w.is_empty() {
            self.solution.w = vec![0.0; dim];
        } else if self.solution.w.len() != dim {
            return Err(PerceptronError::DimensionMismatch {
                expected: dim,
                actual: self.solution.w.len(),
            });
        }
        self.solution.bias = 0.0;
        self.solution.norm = utils::euclidean_norm(&self.solution.w);
        self.solution.margin = 0.0;

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
            {
                let smp = self.samples.borrow();
                for &idx in &index {
                    let point = smp.point(idx);
                    let y = point.label();
                    let f = self.solution.bias + utils::dot(&self.solution.w, point.features());

                    if y * f <= 0.0 {
                        let mut norm_sq = 0.0;
                        for (wj, &xj) in self.solution.w.iter_mut().zip(point.features()) {
                            *wj += rate * y * xj.into();
                            norm_sq += *wj * *wj;
                        }
                        self.solution.norm = norm_sq.sqrt();
                        self.solution.bias += rate * y;
                        self.updates += 1;
                        mistakes += 1;
                    } else if self.sweeps > 0 && mistakes > 1 {
                        // abandon the sweep; the next one starts over anyway
                        break;
                    }
                }
            }
            self.sweeps += 1;
            debug!("sweep {}: {} mistakes", self.sweeps, mistakes);

            if !self.solution.norm.is_finite() || !self.solution.bias.is_finite() {
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

        let converged = matches!(self.stop, Some(StopReason::Converged));
        info!(
            "primal perceptron stopped ({:?}) after {} sweeps, {} updates",
            self.stop, self.sweeps, self.updates
        );
        Ok(converged)
    }

    fn evaluate(&self, point: &Point<T>, raw_value: bool) -> Result<f64> {
        evaluate_primal(&self.solution, point, raw_value)
    }

    fn solution(&self) -> &Solution {
        &self.solution
    }
}

/// Fixed-margin primal perceptron with the Lp regularization family
///
/// A point is a mistake when `y·f ≤ γ·norm − alpha·flexible`. On mistake
/// every other point's dual weight decays by `λ = 1 − rate·γ/norm`, the
/// weight vector is corrected under the update rule selected by `q`, and
/// the mistaken point is swapped toward the front partition of the index
/// so later sweeps revisit it first.
///
/// Update rules (`q` selects the regularization norm being tracked):
/// - `q = 1`: per-coordinate sign-based shrinkage; the norm is the sum of
///   coordinate magnitudes.
/// - `q = 2`: ridge-style shrinkage `w_j·γ/norm`; Euclidean norm.
/// - `q = -1`: shrinkage applied only to the coordinates within
///   [`CLUSTER_EPS`] relative tolerance of the largest magnitude, split
///   evenly across the cluster; the norm is that largest magnitude.
/// - any other `q`: the general Lp rule
///   `w_j·γ·|w_j|^(q-2)·norm^(1-q)`, norm = (Σ|w_j|^q)^(1/q).
pub struct PerceptronFixedMarginPrimal<T: Scalar> {
    samples: SharedSampleSet<T>,
    config: TrainConfig,
    solution: Solution,
    timer: Stopwatch,
    sweeps: usize,
    updates: usize,
    stop: Option<StopReason>,
}

impl<T: Scalar> PerceptronFixedMarginPrimal<T> {
    /// Create an engine bound to a shared sample store with margin `gamma`
    pub fn new(samples: SharedSampleSet<T>, gamma: f64) -> Self {
        let config = TrainConfig {
            gamma,
            ..TrainConfig::default()
        };
        Self::with_config(samples, config)
    }

    /// Create an engine with an explicit configuration
    pub fn with_config(samples: SharedSampleSet<T>, config: TrainConfig) -> Self {
        Self {
            samples,
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

    /// Set the regularization exponent selecting the update rule
    pub fn with_q(mut self, q: f64) -> Self {
        self.config.q = q;
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

    /// Apply the update rule selected by `q` for one mistaken point
    ///
    /// Returns the new norm value. `largw`/`n_cluster` carry the
    /// largest-magnitude cluster state of the `q = -1` rule between
    /// mistakes.
    #[allow(clippy::too_many_arguments)]
    fn apply_norm_rule(
        w: &mut [f64],
        x: &[f64],
        y: f64,
        rate: f64,
        gamma: f64,
        q: f64,
        norm: f64,
        largw: &mut f64,
        n_cluster: &mut usize,
    ) -> f64 {
        if q == 1.0 {
            // sign-based shrinkage on every coordinate
            let mut sumnorm = 0.0;
            for (wj, &xj) in w.iter_mut().zip(x) {
                let shrink = if norm > 0.0 && *wj != 0.0 {
                    gamma * wj.signum()
                } else {
                    0.0
                };
                *wj += rate * (y * xj - shrink);
                sumnorm += wj.abs();
            }
            sumnorm
        } else if q == 2.0 {
            // ridge-style shrinkage
            let mut sumnorm = 0.0;
            for (wj, &xj) in w.iter_mut().zip(x) {
                let shrink = if norm > 0.0 && *wj != 0.0 {
                    *wj * gamma / norm
                } else {
                    0.0
                };
                *wj += rate * (y * xj - shrink);
                sumnorm += *wj * *wj;
            }
            sumnorm.sqrt()
        } else if q == -1.0 {
            // shrinkage split across the largest-magnitude cluster
            for (wj, &xj) in w.iter_mut().zip(x) {
                let in_cluster =
                    *largw == 0.0 || (*largw - wj.abs()).abs() / *largw < CLUSTER_EPS;
                let shrink = if in_cluster && norm > 0.0 && *wj != 0.0 {
                    gamma * wj.signum() / *n_cluster as f64
                } else {
                    0.0
                };
                *wj += rate * (y * xj - shrink);
            }
            let (new_largw, new_count) = max_abs_cluster(w, CLUSTER_EPS);
            *largw = new_largw;
            *n_cluster = new_count;
            new_largw
        } else {
            // general Lp rule via the Hoelder-dual exponent
            let mut sumnorm = 0.0;
            for (wj, &xj) in w.iter_mut().zip(x) {
                let shrink = if norm > 0.0 && *wj != 0.0 {
                    *wj * gamma * wj.abs().powf(q - 2.0) * norm.powf(1.0 - q)
                } else {
                    0.0
                };
                *wj += rate * (y * xj - shrink);
                sumnorm += wj.abs().powf(q);
            }
            sumnorm.powf(1.0 / q)
        }
    }
}

impl<T: Scalar> Classifier<T> for PerceptronFixedMarginPrimal<T> {
    fn train(&mut self) -> Result<bool> {
        self.config.validate()?;
        let (size, dim) = {
            let smp = self.samples.borrow();
            (smp.len(), smp.dim())
        };
        if size == 0 {
            return Err(PerceptronError::EmptySampleSet);
        }
        validate_labels(&self.samples.borrow())?;

        if !self.solution.w.is_empty() && self.solution.w.len() != dim {
            return Err(PerceptronError::DimensionMismatch {
                expected: dim,
                actual: self.solution.w.len(),
            });
        }
        if !self.solution.func.is_empty() && self.solution.func.len() != size {
            return Err(PerceptronError::DimensionMismatch {
                expected: size,
                actual: self.solution.func.len(),
            });
        }
        let mut w = std::mem::take(&mut self.solution.w);
        if w.is_empty() {
            w = vec![0.0; dim];
        }
        let mut func = std::mem::take(&mut self.solution.func);
        if func.is_empty() {
            func = vec![0.0; size];
        }

        let mut bias = self.solution.bias;
        let rate = self.config.rate;
        let gamma = self.config.gamma;
        let flexible = self.config.flexible;
        let q = self.config.q;
        let mut norm = self.solution.norm;
        if norm == 0.0 && w.iter().any(|&v| v != 0.0) {
            // seeded weights without a norm: derive it under the active rule
            norm = if q == 1.0 {
                utils::sum_abs_norm(&w)
            } else if q == 2.0 {
                utils::euclidean_norm(&w)
            } else if q == -1.0 {
                utils::max_abs_norm(&w)
            } else {
                utils::p_norm(&w, q)
            };
        }
        let mut index = self.samples.borrow().index().to_vec();
        let (mut largw, mut n_cluster) = max_abs_cluster(&w, CLUSTER_EPS);
        if largw == 0.0 {
            n_cluster = dim;
        }
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
                let (x, y, alpha_idx) = {
                    let smp = self.samples.borrow();
                    let point = smp.point(idx);
                    (
                        widen_features(point.features()),
                        point.label(),
                        point.alpha(),
                    )
                };
                let f = bias + utils::dot(&w, &x);
                func[idx] = f;

                if y * f <= gamma * norm - alpha_idx * flexible {
                    // global Lagrangian rescaling of every other point
                    let lambda = if norm != 0.0 {
                        1.0 - rate * gamma / norm
                    } else {
                        1.0
                    };
                    {
                        let mut smp = self.samples.borrow_mut();
                        for r in 0..size {
                            if r != idx {
                                let a = smp.alpha(r);
                                smp.set_alpha(r, a * lambda);
                            }
                        }
                        let a = smp.alpha(idx);
                        smp.set_alpha(idx, a + rate);
                    }

                    norm = Self::apply_norm_rule(
                        &mut w,
                        &x,
                        y,
                        rate,
                        gamma,
                        q,
                        norm,
                        &mut largw,
                        &mut n_cluster,
                    );
                    bias += rate * y;

                    // swap the mistaken point into the front partition
                    let k = if i > partition {
                        let k = partition;
                        partition += 1;
                        k
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
                "sweep {}: {} mistakes, norm {:.6}",
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

        self.solution.w = w;
        self.solution.norm = norm;
        self.solution.bias = bias;
        self.solution.func = func;
        self.solution.margin = gamma;
        self.solution.alpha = self.samples.borrow().alphas();
        self.samples.borrow_mut().set_index(index)?;

        let converged = matches!(self.stop, Some(StopReason::Converged));
        info!(
            "fixed-margin primal perceptron stopped ({:?}) after {} sweeps, {} updates",
            self.stop, self.sweeps, self.updates
        );
        Ok(converged)
    }

    fn evaluate(&self, point: &Point<T>, raw_value: bool) -> Result<f64> {
        evaluate_primal(&self.solution, point, raw_value)
    }

    fn solution(&self) -> &Solution {
        &self.solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SampleSet;
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

    /// One-point store used to drive a single prescribed mistake
    fn single_point(x: Vec<f64>, y: f64) -> SharedSampleSet<f64> {
        SampleSet::from_points(vec![Point::new(x, y)])
            .expect("valid point")
            .into_shared()
    }

    fn one_mistake_engine(
        samples: SharedSampleSet<f64>,
        q: f64,
        rate: f64,
        gamma: f64,
        w: Vec<f64>,
        norm: f64,
    ) -> PerceptronFixedMarginPrimal<f64> {
        let solution = Solution {
            w,
            norm,
            ..Solution::new()
        };
        PerceptronFixedMarginPrimal::new(samples, gamma)
            .with_q(q)
            .with_rate(rate)
            .with_max_sweeps(1)
            .with_initial_solution(solution)
    }

    #[test]
    fn test_plain_converges_on_separable_set() {
        let mut engine = PerceptronPrimal::new(separable_set()).with_rate(1.0);
        let converged = engine.train().expect("training should succeed");

        assert!(converged);
        assert!(engine.sweeps() <= 5);
        assert_eq!(engine.stop_reason(), Some(StopReason::Converged));
        assert!(engine.updates() > 0);
        assert!(engine.solution().is_finite());
    }

    #[test]
    fn test_plain_end_to_end_predictions() {
        let mut engine = PerceptronPrimal::new(separable_set()).with_rate(1.0);
        assert!(engine.train().expect("training should succeed"));

        let pos = Point::new(vec![0.5, 0.5], 1.0);
        let neg = Point::new(vec![-0.5, -0.5], -1.0);
        assert_eq!(engine.evaluate(&pos, false).unwrap(), 1.0);
        assert_eq!(engine.evaluate(&neg, false).unwrap(), -1.0);
    }

    #[test]
    fn test_plain_timeout_returns_false_with_valid_state() {
        let mut engine = PerceptronPrimal::new(separable_set())
            .with_rate(1.0)
            .with_max_time(Duration::ZERO);
        let converged = engine.train().expect("training should succeed");

        assert!(!converged);
        assert_eq!(engine.stop_reason(), Some(StopReason::TimeLimit));
        let solution = engine.solution();
        assert_eq!(solution.dim(), 2);
        assert!(solution.is_finite());
    }

    #[test]
    fn test_plain_evaluate_idempotent_and_consistent() {
        let mut engine = PerceptronPrimal::new(separable_set()).with_rate(1.0);
        assert!(engine.train().expect("training should succeed"));

        let query = Point::new(vec![0.3, 0.9], 1.0);
        let raw_a = engine.evaluate(&query, true).unwrap();
        let raw_b = engine.evaluate(&query, true).unwrap();
        assert_eq!(raw_a, raw_b);

        let label = engine.evaluate(&query, false).unwrap();
        let threshold = engine.solution().margin * engine.solution().norm;
        assert_eq!(label, if raw_a > threshold { 1.0 } else { -1.0 });
    }

    #[test]
    fn test_plain_evaluate_rejects_dimension_mismatch() {
        let mut engine = PerceptronPrimal::new(separable_set()).with_rate(1.0);
        assert!(engine.train().expect("training should succeed"));

        let query = Point::new(vec![1.0, 2.0, 3.0], 1.0);
        let result = engine.evaluate(&query, true);
        assert!(matches!(
            result,
            Err(PerceptronError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_plain_rejects_invalid_labels() {
        let samples = SampleSet::from_points(vec![Point::new(vec![1.0], 2.0)])
            .expect("valid point")
            .into_shared();
        let mut engine = PerceptronPrimal::new(samples);
        assert!(matches!(
            engine.train(),
            Err(PerceptronError::InvalidLabel(y)) if y == 2.0
        ));
    }

    #[test]
    fn test_plain_detects_non_finite_updates() {
        let samples = SampleSet::from_points(vec![Point::new(vec![1e200], 1.0)])
            .expect("valid point")
            .into_shared();
        let mut engine = PerceptronPrimal::new(samples).with_rate(1e200);
        assert!(matches!(
            engine.train(),
            Err(PerceptronError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn test_fixed_margin_converges_with_small_margin() {
        let mut engine = PerceptronFixedMarginPrimal::new(separable_set(), 0.05)
            .with_rate(0.5)
            .with_q(2.0);
        let converged = engine.train().expect("training should succeed");

        assert!(converged);
        assert_eq!(engine.stop_reason(), Some(StopReason::Converged));
        assert!(engine.solution().norm > 0.0);
        assert_relative_eq!(engine.solution().margin, 0.05);
    }

    #[test]
    fn test_fixed_margin_halts_exactly_on_clean_sweep() {
        let samples = separable_set();
        let mut engine = PerceptronFixedMarginPrimal::new(samples.clone(), 0.0)
            .with_rate(1.0)
            .with_q(2.0);
        assert!(engine.train().expect("training should succeed"));
        let updates_first = engine.updates();
        assert!(updates_first > 0);

        // resuming from the converged solution commits zero updates
        let solution = engine.solution().clone();
        let mut resumed = PerceptronFixedMarginPrimal::new(samples, 0.0)
            .with_rate(1.0)
            .with_q(2.0)
            .with_initial_solution(solution);
        assert!(resumed.train().expect("training should succeed"));
        assert_eq!(resumed.updates(), 0);
        assert_eq!(resumed.sweeps(), 1);
    }

    #[test]
    fn test_fixed_margin_maintains_index_permutation() {
        let samples = separable_set();
        let mut engine = PerceptronFixedMarginPrimal::new(samples.clone(), 0.1)
            .with_rate(0.5)
            .with_q(2.0);
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
    fn test_fixed_margin_accumulates_alphas() {
        let samples = separable_set();
        let mut engine = PerceptronFixedMarginPrimal::new(samples.clone(), 0.1)
            .with_rate(0.5)
            .with_q(2.0);
        engine.train().expect("training should succeed");

        let total: f64 = samples.borrow().alphas().iter().sum();
        assert!(total > 0.0);
        assert_eq!(engine.solution().alpha, samples.borrow().alphas());
    }

    // closed-form checks for the four update rules, one prescribed mistake
    // each: rate, margin and the prior weight vector are fixed by hand.

    #[test]
    fn test_norm_rule_sign_shrinkage() {
        let samples = single_point(vec![2.0, 1.0, 1.0], 1.0);
        let mut engine =
            one_mistake_engine(samples, 1.0, 0.5, 0.6, vec![1.0, -2.0, 0.0], 3.0);
        assert!(!engine.train().expect("training should succeed"));
        assert_eq!(engine.updates(), 1);

        let solution = engine.solution();
        assert_relative_eq!(solution.w[0], 1.7, epsilon = 1e-12);
        assert_relative_eq!(solution.w[1], -1.2, epsilon = 1e-12);
        assert_relative_eq!(solution.w[2], 0.5, epsilon = 1e-12);
        assert_relative_eq!(solution.norm, 3.4, epsilon = 1e-12);
        assert_relative_eq!(solution.bias, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_norm_rule_ridge() {
        let samples = single_point(vec![1.0, 0.0, 0.0], -1.0);
        let mut engine =
            one_mistake_engine(samples, 2.0, 1.0, 0.5, vec![1.0, 2.0, 2.0], 3.0);
        assert!(!engine.train().expect("training should succeed"));

        // shrink_j = w_j * gamma / norm = w_j / 6
        let solution = engine.solution();
        assert_relative_eq!(solution.w[0], -1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(solution.w[1], 2.0 - 2.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(solution.w[2], 2.0 - 2.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(solution.norm, (201.0_f64).sqrt() / 6.0, epsilon = 1e-12);
        assert_relative_eq!(solution.bias, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_norm_rule_largest_cluster() {
        let samples = single_point(vec![1.0, 1.0, 1.0], -1.0);
        let mut engine =
            one_mistake_engine(samples, -1.0, 1.0, 0.4, vec![2.0, 2.0, 1.0], 2.0);
        assert!(!engine.train().expect("training should succeed"));

        // cluster {w0, w1}: shrink = gamma * sign / 2 = 0.2, w2 untouched
        let solution = engine.solution();
        assert_relative_eq!(solution.w[0], 0.8, epsilon = 1e-12);
        assert_relative_eq!(solution.w[1], 0.8, epsilon = 1e-12);
        assert_relative_eq!(solution.w[2], 0.0, epsilon = 1e-12);
        assert_relative_eq!(solution.norm, 0.8, epsilon = 1e-12);
        assert_relative_eq!(solution.bias, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_norm_rule_general_lp() {
        let samples = single_point(vec![1.0, 0.0, 1.0], -1.0);
        let norm0 = 9.0_f64.powf(1.0 / 3.0);
        let mut engine =
            one_mistake_engine(samples, 3.0, 1.0, 0.3, vec![1.0, 2.0, 0.0], norm0);
        assert!(!engine.train().expect("training should succeed"));

        let shrink0 = 0.3 * norm0.powf(-2.0);
        let shrink1 = 2.0 * 0.3 * 2.0 * norm0.powf(-2.0);
        let w0 = 1.0 + (-1.0 - shrink0);
        let w1 = 2.0 + (0.0 - shrink1);
        let w2: f64 = -1.0;
        let expected_norm =
            (w0.abs().powf(3.0) + w1.abs().powf(3.0) + w2.abs().powf(3.0)).powf(1.0 / 3.0);

        let solution = engine.solution();
        assert_relative_eq!(solution.w[0], w0, epsilon = 1e-12);
        assert_relative_eq!(solution.w[1], w1, epsilon = 1e-12);
        assert_relative_eq!(solution.w[2], w2, epsilon = 1e-12);
        assert_relative_eq!(solution.norm, expected_norm, epsilon = 1e-12);
    }

    #[test]
    fn test_max_abs_cluster_tie_break() {
        // ties within relative tolerance join the cluster of the running max
        let (largest, count) = max_abs_cluster(&[2.0, -2.0, 1.0, 2.00001], CLUSTER_EPS);
        assert_relative_eq!(largest, 2.0, epsilon = 1e-12);
        assert_eq!(count, 3);

        let (largest, count) = max_abs_cluster(&[0.0, 0.0], CLUSTER_EPS);
        assert_eq!(largest, 0.0);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_fixed_margin_f32_features() {
        let samples = SampleSet::from_points(vec![
            Point::new(vec![1.0_f32, 1.0], 1.0),
            Point::new(vec![-1.0_f32, -1.0], -1.0),
        ])
        .expect("valid points")
        .into_shared();

        let mut engine = PerceptronFixedMarginPrimal::new(samples, 0.05)
            .with_rate(0.5)
            .with_q(2.0);
        assert!(engine.train().expect("training should succeed"));
    }
}
