//! Labeled points and the shared sample store
//!
//! The [`SampleSet`] is owned jointly by the training engine and external
//! callers (validation harnesses, ensemble wrappers). Engines never resize
//! it; they only overwrite per-point dual weights and reorder the
//! permutation index through the accessors here.

use crate::core::{PerceptronError, Result, Scalar};
use std::cell::RefCell;
use std::rc::Rc;

/// Sentinel label for points that have not been classified yet
pub const LABEL_UNSET: f64 = f64::NAN;

/// A labeled feature vector with its accumulated dual weight
#[derive(Debug, Clone)]
pub struct Point<T: Scalar> {
    x: Vec<T>,
    y: f64,
    alpha: f64,
    id: usize,
}

impl<T: Scalar> Point<T> {
    /// Create a labeled point
    pub fn new(x: Vec<T>, y: f64) -> Self {
        Self {
            x,
            y,
            alpha: 0.0,
            id: 0,
        }
    }

    /// Create a point whose label is not yet known
    pub fn unlabeled(x: Vec<T>) -> Self {
        Self::new(x, LABEL_UNSET)
    }

    /// Feature vector
    pub fn features(&self) -> &[T] {
        &self.x
    }

    /// Feature dimension
    pub fn dim(&self) -> usize {
        self.x.len()
    }

    /// Label value; `LABEL_UNSET` (NaN) when not assigned
    pub fn label(&self) -> f64 {
        self.y
    }

    /// Whether a label has been assigned
    pub fn has_label(&self) -> bool {
        !self.y.is_nan()
    }

    /// Assign the label
    pub fn set_label(&mut self, y: f64) {
        self.y = y;
    }

    /// Accumulated dual weight
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Overwrite the dual weight
    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    /// Point identifier
    pub fn id(&self) -> usize {
        self.id
    }

    /// Set the point identifier
    pub fn set_id(&mut self, id: usize) {
        self.id = id;
    }
}

/// Shared handle through which an engine and its callers hold one store
///
/// Training is single-threaded; mutation is serialized through the
/// `RefCell` for the duration of each accessor call.
pub type SharedSampleSet<T> = Rc<RefCell<SampleSet<T>>>;

/// Ordered collection of points with a mutable permutation index
///
/// Invariant: the index is always a permutation of `[0, len)`. Engines
/// reorder it to revisit recently mistaken points first, but never change
/// its length.
#[derive(Debug, Clone)]
pub struct SampleSet<T: Scalar> {
    points: Vec<Point<T>>,
    index: Vec<usize>,
    dim: usize,
    classes: Vec<f64>,
    class_counts: Vec<usize>,
}

impl<T: Scalar> SampleSet<T> {
    /// Create an empty store for points of the given dimension
    pub fn new(dim: usize) -> Self {
        Self {
            points: Vec::new(),
            index: Vec::new(),
            dim,
            classes: Vec::new(),
            class_counts: Vec::new(),
        }
    }

    /// Build a store from points, validating dimensional consistency
    pub fn from_points(points: Vec<Point<T>>) -> Result<Self> {
        let dim = match points.first() {
            Some(p) => p.dim(),
            None => return Err(PerceptronError::EmptySampleSet),
        };
        let mut set = Self::new(dim);
        for point in points {
            set.push(point)?;
        }
        Ok(set)
    }

    /// Wrap the store in the shared reference-counted handle
    pub fn into_shared(self) -> SharedSampleSet<T> {
        Rc::new(RefCell::new(self))
    }

    /// Append a point, extending the permutation index and class metadata
    pub fn push(&mut self, mut point: Point<T>) -> Result<()> {
        if point.dim() != self.dim {
            return Err(PerceptronError::DimensionMismatch {
                expected: self.dim,
                actual: point.dim(),
            });
        }
        if point.id() == 0 {
            point.set_id(self.points.len() + 1);
        }
        if point.has_label() {
            self.count_label(point.label());
        }
        self.index.push(self.points.len());
        self.points.push(point);
        Ok(())
    }

    fn count_label(&mut self, y: f64) {
        match self.classes.iter().position(|&c| c == y) {
            Some(pos) => self.class_counts[pos] += 1,
            None => {
                self.classes.push(y);
                self.class_counts.push(1);
            }
        }
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the store holds no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Feature dimension
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Point at a store position
    pub fn point(&self, i: usize) -> &Point<T> {
        &self.points[i]
    }

    /// All points in store order
    pub fn points(&self) -> &[Point<T>] {
        &self.points
    }

    /// Replace the point at a store position
    pub fn set_point(&mut self, i: usize, point: Point<T>) -> Result<()> {
        if point.dim() != self.dim {
            return Err(PerceptronError::DimensionMismatch {
                expected: self.dim,
                actual: point.dim(),
            });
        }
        self.points[i] = point;
        Ok(())
    }

    /// Dual weight of the point at a store position
    pub fn alpha(&self, i: usize) -> f64 {
        self.points[i].alpha
    }

    /// Overwrite the dual weight of the point at a store position
    pub fn set_alpha(&mut self, i: usize, alpha: f64) {
        self.points[i].alpha = alpha;
    }

    /// Scale every point's dual weight by a common factor
    pub fn scale_alphas(&mut self, factor: f64) {
        for point in &mut self.points {
            point.alpha *= factor;
        }
    }

    /// Dual weights of all points in store order
    pub fn alphas(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.alpha).collect()
    }

    /// Labels of all points in store order
    pub fn labels(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    /// Distinct labels seen so far
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    /// Number of points carrying the given label
    pub fn class_count(&self, y: f64) -> usize {
        self.classes
            .iter()
            .position(|&c| c == y)
            .map_or(0, |pos| self.class_counts[pos])
    }

    /// Current visitation order
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Replace the visitation order; must be a permutation of `[0, len)`
    pub fn set_index(&mut self, index: Vec<usize>) -> Result<()> {
        if index.len() != self.points.len() {
            return Err(PerceptronError::InvalidIndex {
                size: self.points.len(),
            });
        }
        let mut seen = vec![false; index.len()];
        for &i in &index {
            if i >= seen.len() || seen[i] {
                return Err(PerceptronError::InvalidIndex {
                    size: self.points.len(),
                });
            }
            seen[i] = true;
        }
        self.index = index;
        Ok(())
    }

    /// Restore the identity visitation order
    pub fn reset_index(&mut self) {
        self.index = (0..self.points.len()).collect();
    }
}
