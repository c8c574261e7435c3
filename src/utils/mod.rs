//! Dense vector math helpers and the wall-clock training budget

use crate::core::Scalar;
use std::time::{Duration, Instant};

/// Dot product between a weight vector and a feature slice
pub fn dot<T: Scalar>(w: &[f64], x: &[T]) -> f64 {
    w.iter().zip(x.iter()).map(|(&wj, &xj)| wj * xj.into()).sum()
}

/// Dot product between two feature slices
pub fn dot_features<T: Scalar>(x: &[T], y: &[T]) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| xi.into() * yi.into())
        .sum()
}

/// Squared Euclidean distance between two feature slices
pub fn squared_distance<T: Scalar>(x: &[T], y: &[T]) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| {
            let d = xi.into() - yi.into();
            d * d
        })
        .sum()
}

/// Sum of absolute values
pub fn sum_abs_norm(w: &[f64]) -> f64 {
    w.iter().map(|v| v.abs()).sum()
}

/// Euclidean norm
pub fn euclidean_norm(w: &[f64]) -> f64 {
    w.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Largest absolute value
pub fn max_abs_norm(w: &[f64]) -> f64 {
    w.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

/// General p-norm: (sum |w_j|^p)^(1/p)
pub fn p_norm(w: &[f64], p: f64) -> f64 {
    w.iter()
        .map(|v| v.abs().powf(p))
        .sum::<f64>()
        .powf(1.0 / p)
}

/// Elapsed-time source bounding the duration of a training run
///
/// The engines poll this once per outer sweep; an in-flight point update
/// always completes before the budget check fires.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    /// Create a stopwatch whose reference point is now
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Move the reference point to now
    pub fn reset(&mut self) {
        self.start = Instant::now();
    }

    /// Time elapsed since the last reset
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dot() {
        let w = vec![1.0, -2.0, 0.5];
        let x = vec![2.0_f64, 1.0, 4.0];
        assert_relative_eq!(dot(&w, &x), 2.0 - 2.0 + 2.0);
    }

    #[test]
    fn test_dot_f32_features() {
        let w = vec![1.0, 2.0];
        let x = vec![0.5_f32, 0.25];
        assert_relative_eq!(dot(&w, &x), 1.0);
    }

    #[test]
    fn test_dot_features() {
        let x = vec![1.0_f64, 2.0, 3.0];
        let y = vec![4.0_f64, 5.0, 6.0];
        assert_relative_eq!(dot_features(&x, &y), 32.0);
    }

    #[test]
    fn test_squared_distance() {
        let x = vec![0.0_f64, 3.0];
        let y = vec![4.0_f64, 0.0];
        assert_relative_eq!(squared_distance(&x, &y), 25.0);
        assert_relative_eq!(squared_distance(&x, &x), 0.0);
    }

    #[test]
    fn test_norms() {
        let w = vec![3.0, -4.0];
        assert_relative_eq!(sum_abs_norm(&w), 7.0);
        assert_relative_eq!(euclidean_norm(&w), 5.0);
        assert_relative_eq!(max_abs_norm(&w), 4.0);
    }

    #[test]
    fn test_p_norm_matches_special_cases() {
        let w = vec![1.0, -2.0, 2.0];
        assert_relative_eq!(p_norm(&w, 1.0), sum_abs_norm(&w), epsilon = 1e-12);
        assert_relative_eq!(p_norm(&w, 2.0), euclidean_norm(&w), epsilon = 1e-12);
    }

    #[test]
    fn test_p_norm_cubic() {
        let w = vec![1.0, 2.0];
        // (1 + 8)^(1/3)
        assert_relative_eq!(p_norm(&w, 3.0), 9.0_f64.powf(1.0 / 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_norms_empty() {
        let w: Vec<f64> = vec![];
        assert_eq!(sum_abs_norm(&w), 0.0);
        assert_eq!(euclidean_norm(&w), 0.0);
        assert_eq!(max_abs_norm(&w), 0.0);
    }

    #[test]
    fn test_stopwatch_monotonic() {
        let mut sw = Stopwatch::new();
        let first = sw.elapsed();
        let second = sw.elapsed();
        assert!(second >= first);

        sw.reset();
        assert!(sw.elapsed() <= second + Duration::from_secs(1));
    }
}
