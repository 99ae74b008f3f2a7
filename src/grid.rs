//! Rectilinear weight grids.
//!
//! A [`Grid`] pairs one strictly increasing knot sequence per axis with an
//! N-dimensional array of non-negative weights, one weight per lattice point.
//! The grid is read-only once built; sampling state lives elsewhere.
//!
//! Cells are the boxes between adjacent knots. A coordinate sitting exactly on an
//! interior knot belongs to the lower-indexed of its two neighbouring cells.

use ndarray::ArrayD;

use crate::error::{Error, Result};

/// Where a point falls on the lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// Interval index per axis, each in `0..=len(axis) - 2`.
    pub cell: Vec<usize>,
    /// Fractional position inside the cell per axis, each in `[0, 1]`.
    pub offsets: Vec<f64>,
}

/// Knot sequences plus an aligned weight grid.
#[derive(Debug, Clone)]
pub struct Grid {
    knots: Vec<Vec<f64>>,
    shape: Vec<usize>,
    strides: Vec<usize>,
    weights: Vec<f64>,
    max_weight: f64,
}

impl Grid {
    /// Build a grid from knots and an N-dimensional weight array.
    ///
    /// The array may have any memory layout; it is read in logical (row-major) order.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidKnots`] if there are no axes, or an axis has fewer than two
    ///   knots, a non-finite knot, or is not strictly increasing.
    /// - [`Error::ShapeMismatch`] if the array shape differs from the knot lengths.
    /// - [`Error::InvalidWeights`] if a weight is negative or non-finite, or all are zero.
    pub fn new(knots: Vec<Vec<f64>>, weights: ArrayD<f64>) -> Result<Self> {
        validate_knots(&knots)?;
        let expected: Vec<usize> = knots.iter().map(Vec::len).collect();
        if weights.shape() != expected.as_slice() {
            return Err(Error::ShapeMismatch {
                expected,
                got: weights.shape().to_vec(),
            });
        }
        Self::assemble(knots, weights.iter().copied().collect())
    }

    /// Build a grid from knots and a flat row-major weight buffer.
    ///
    /// The shape is taken from the knot lengths; the last axis varies fastest.
    pub fn from_flat(knots: Vec<Vec<f64>>, weights: Vec<f64>) -> Result<Self> {
        validate_knots(&knots)?;
        let expected: Vec<usize> = knots.iter().map(Vec::len).collect();
        let total: usize = expected.iter().product();
        if weights.len() != total {
            return Err(Error::ShapeMismatch {
                expected,
                got: vec![weights.len()],
            });
        }
        Self::assemble(knots, weights)
    }

    fn assemble(knots: Vec<Vec<f64>>, weights: Vec<f64>) -> Result<Self> {
        let mut max_weight = 0.0_f64;
        for (i, &w) in weights.iter().enumerate() {
            if !w.is_finite() {
                return Err(Error::InvalidWeights(format!(
                    "weight at flat index {i} is not finite (got {w})"
                )));
            }
            if w < 0.0 {
                return Err(Error::InvalidWeights(format!(
                    "weight at flat index {i} is negative (got {w})"
                )));
            }
            max_weight = max_weight.max(w);
        }
        if max_weight <= 0.0 {
            return Err(Error::InvalidWeights(
                "all weights are zero; no density to sample".to_string(),
            ));
        }

        let shape: Vec<usize> = knots.iter().map(Vec::len).collect();
        let mut strides = vec![1usize; shape.len()];
        for axis in (0..shape.len().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * shape[axis + 1];
        }

        Ok(Self {
            knots,
            shape,
            strides,
            weights,
            max_weight,
        })
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.knots.len()
    }

    /// Number of knots per axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Knot sequence of one axis.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= self.ndim()`.
    pub fn knots(&self, axis: usize) -> &[f64] {
        &self.knots[axis]
    }

    /// `(min, max)` of one axis.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= self.ndim()`.
    pub fn bounds(&self, axis: usize) -> (f64, f64) {
        let k = &self.knots[axis];
        (k[0], k[k.len() - 1])
    }

    /// Total number of cells in the lattice.
    pub fn cell_count(&self) -> usize {
        self.shape.iter().map(|&n| n - 1).product()
    }

    /// Largest weight anywhere on the grid.
    pub fn max_weight(&self) -> f64 {
        self.max_weight
    }

    /// Weight at a lattice index, or `None` if the index is out of range.
    pub fn weight(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.ndim() || index.iter().zip(&self.shape).any(|(&i, &n)| i >= n) {
            return None;
        }
        Some(self.weights[self.flat_index(index)])
    }

    /// Locate a single coordinate along `axis`: `(interval index, fractional offset)`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfDomain`] if `value` is outside the axis range or not finite.
    pub fn locate_axis(&self, axis: usize, value: f64) -> Result<(usize, f64)> {
        let k = &self.knots[axis];
        let (min, max) = (k[0], k[k.len() - 1]);
        // NaN fails both comparisons and lands here too.
        if !(value >= min && value <= max) {
            return Err(Error::OutOfDomain {
                axis,
                value,
                min,
                max,
            });
        }
        let upper = k.partition_point(|&x| x < value);
        let cell = upper.saturating_sub(1).min(k.len() - 2);
        let (lo, hi) = (k[cell], k[cell + 1]);
        let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
        Ok((cell, t))
    }

    /// Map a point to its cell and the fractional offsets inside that cell.
    ///
    /// # Errors
    ///
    /// - [`Error::DimensionMismatch`] if `point.len() != self.ndim()`.
    /// - [`Error::OutOfDomain`] if any coordinate is outside its axis range.
    pub fn locate(&self, point: &[f64]) -> Result<Location> {
        if point.len() != self.ndim() {
            return Err(Error::DimensionMismatch {
                expected: self.ndim(),
                got: point.len(),
            });
        }
        let mut cell = Vec::with_capacity(point.len());
        let mut offsets = Vec::with_capacity(point.len());
        for (axis, &x) in point.iter().enumerate() {
            let (c, t) = self.locate_axis(axis, x)?;
            cell.push(c);
            offsets.push(t);
        }
        Ok(Location { cell, offsets })
    }

    #[inline]
    pub(crate) fn flat_index(&self, index: &[usize]) -> usize {
        index.iter().zip(&self.strides).map(|(&i, &s)| i * s).sum()
    }

    #[inline]
    pub(crate) fn stride(&self, axis: usize) -> usize {
        self.strides[axis]
    }

    #[inline]
    pub(crate) fn weight_flat(&self, flat: usize) -> f64 {
        self.weights[flat]
    }
}

fn validate_knots(knots: &[Vec<f64>]) -> Result<()> {
    if knots.is_empty() {
        return Err(Error::InvalidKnots {
            axis: 0,
            reason: "grid needs at least one axis".to_string(),
        });
    }
    for (axis, k) in knots.iter().enumerate() {
        if k.len() < 2 {
            return Err(Error::InvalidKnots {
                axis,
                reason: format!("need at least 2 knots, got {}", k.len()),
            });
        }
        if let Some(x) = k.iter().find(|x| !x.is_finite()) {
            return Err(Error::InvalidKnots {
                axis,
                reason: format!("knot {x} is not finite"),
            });
        }
        if let Some(i) = k.windows(2).position(|w| w[1] <= w[0]) {
            return Err(Error::InvalidKnots {
                axis,
                reason: format!(
                    "knots must be strictly increasing ({} then {} at index {})",
                    k[i],
                    k[i + 1],
                    i + 1
                ),
            });
        }
    }
    Ok(())
}
