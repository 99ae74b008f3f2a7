//! Conditional sampling: fill in the free coordinates of a partially known point.
//!
//! Holding some axes of a multilinear function fixed leaves a function that is
//! still multilinear in the remaining axes. A [`ConditionalView`] exposes that
//! slice as a lower-dimensional [`LatticeDensity`], so the ordinary rejection
//! sampler runs on it unchanged. The slice lies inside the grid cells it cuts
//! through, so the grid's corner maxima remain valid ceilings and one
//! [`EnvelopeCache`] serves every slice of a grid, whatever the fixed values.

use rand::Rng;

use crate::density::LatticeDensity;
use crate::envelope::EnvelopeCache;
use crate::error::{Error, Result};
use crate::grid::{Grid, Location};
use crate::rejection::RejectionSampler;

/// A point with an explicit mask of fixed and free axes.
///
/// Values at free axes are placeholders until a draw writes them.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialPoint {
    values: Vec<f64>,
    fixed: Vec<bool>,
}

impl PartialPoint {
    /// A point with all `ndim` axes free.
    pub fn free(ndim: usize) -> Self {
        Self {
            values: vec![0.0; ndim],
            fixed: vec![false; ndim],
        }
    }

    /// Pair values with a fixed-axis mask.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if the lengths differ.
    pub fn new(values: Vec<f64>, fixed: Vec<bool>) -> Result<Self> {
        if values.len() != fixed.len() {
            return Err(Error::DimensionMismatch {
                expected: values.len(),
                got: fixed.len(),
            });
        }
        Ok(Self { values, fixed })
    }

    /// `Some(x)` marks a fixed coordinate, `None` a missing one.
    pub fn from_options(coords: &[Option<f64>]) -> Self {
        Self {
            values: coords.iter().map(|c| c.unwrap_or(0.0)).collect(),
            fixed: coords.iter().map(Option::is_some).collect(),
        }
    }

    /// Number of coordinates.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the point has no coordinates at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All coordinates, fixed and drawn.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Fixed-axis mask.
    pub fn fixed_mask(&self) -> &[bool] {
        &self.fixed
    }

    /// Whether `axis` holds a known value.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= self.len()`.
    pub fn is_fixed(&self, axis: usize) -> bool {
        self.fixed[axis]
    }

    /// Coordinate at `axis` if it is fixed.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= self.len()`.
    pub fn get(&self, axis: usize) -> Option<f64> {
        self.fixed[axis].then(|| self.values[axis])
    }

    /// Fix `axis` at `value`.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= self.len()`.
    pub fn fix(&mut self, axis: usize, value: f64) {
        self.values[axis] = value;
        self.fixed[axis] = true;
    }

    /// Axes still to be drawn, in increasing order.
    pub fn free_axes(&self) -> impl Iterator<Item = usize> + '_ {
        self.fixed
            .iter()
            .enumerate()
            .filter_map(|(axis, &f)| (!f).then_some(axis))
    }

    /// Whether every axis is fixed.
    pub fn is_complete(&self) -> bool {
        self.fixed.iter().all(|&f| f)
    }
}

/// The grid's density restricted to the free axes of a [`PartialPoint`].
#[derive(Debug, Clone)]
pub struct ConditionalView<'g> {
    grid: &'g Grid,
    free: Vec<usize>,
    // Reduced axis of each grid axis, `None` where the axis is fixed.
    slot: Vec<Option<usize>>,
    // Full-dimensional cell and offsets with the fixed axes already filled in.
    cell: Vec<usize>,
    offsets: Vec<f64>,
}

impl<'g> ConditionalView<'g> {
    /// Slice `grid` at the fixed coordinates of `point`.
    ///
    /// # Errors
    ///
    /// - [`Error::DimensionMismatch`] if `point` and `grid` differ in dimension.
    /// - [`Error::NoFreeAxes`] if every axis of `point` is fixed.
    /// - [`Error::OutOfDomain`] if a fixed coordinate is outside its axis range.
    pub fn new(grid: &'g Grid, point: &PartialPoint) -> Result<Self> {
        if point.len() != grid.ndim() {
            return Err(Error::DimensionMismatch {
                expected: grid.ndim(),
                got: point.len(),
            });
        }
        let free: Vec<usize> = point.free_axes().collect();
        if free.is_empty() {
            return Err(Error::NoFreeAxes);
        }

        let mut slot = vec![None; grid.ndim()];
        let mut cell = vec![0; grid.ndim()];
        let mut offsets = vec![0.0; grid.ndim()];
        for axis in 0..grid.ndim() {
            if let Some(x) = point.get(axis) {
                let (c, t) = grid.locate_axis(axis, x)?;
                cell[axis] = c;
                offsets[axis] = t;
            }
        }
        for (i, &axis) in free.iter().enumerate() {
            slot[axis] = Some(i);
        }

        Ok(Self {
            grid,
            free,
            slot,
            cell,
            offsets,
        })
    }

    /// Full-grid axis index of each reduced axis.
    pub fn free_axes(&self) -> &[usize] {
        &self.free
    }

    /// Exact maximum of the slice on a reduced `cell`.
    ///
    /// Each reduced corner is the full interpolant at the fixed coordinates, so
    /// this never exceeds the grid's corner maximum for the enclosing cell.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is shorter than the number of free axes or indexes past
    /// the last cell.
    pub fn corner_max(&self, cell: &[usize]) -> f64 {
        let mut max = 0.0_f64;
        for corner in 0..(1usize << self.free.len()) {
            let value = self.grid.interpolate_with(|axis| match self.slot[axis] {
                Some(i) => (cell[i], ((corner >> i) & 1) as f64),
                None => (self.cell[axis], self.offsets[axis]),
            });
            max = max.max(value);
        }
        max
    }
}

impl LatticeDensity for ConditionalView<'_> {
    fn ndim(&self) -> usize {
        self.free.len()
    }

    fn bounds(&self, axis: usize) -> (f64, f64) {
        self.grid.bounds(self.free[axis])
    }

    fn locate(&self, point: &[f64]) -> Result<Location> {
        if point.len() != self.free.len() {
            return Err(Error::DimensionMismatch {
                expected: self.free.len(),
                got: point.len(),
            });
        }
        let mut cell = Vec::with_capacity(point.len());
        let mut offsets = Vec::with_capacity(point.len());
        for (&axis, &x) in self.free.iter().zip(point) {
            let (c, t) = self.grid.locate_axis(axis, x)?;
            cell.push(c);
            offsets.push(t);
        }
        Ok(Location { cell, offsets })
    }

    fn density_at(&self, location: &Location) -> f64 {
        self.grid.interpolate_with(|axis| match self.slot[axis] {
            Some(i) => (location.cell[i], location.offsets[i]),
            None => (self.cell[axis], self.offsets[axis]),
        })
    }

    fn grid_cell(&self, cell: &[usize], out: &mut Vec<usize>) {
        out.clear();
        out.extend(
            self.slot
                .iter()
                .zip(&self.cell)
                .map(|(slot, &fixed)| slot.map_or(fixed, |i| cell[i])),
        );
    }

    fn grid_corner_max(&self, grid_cell: &[usize]) -> f64 {
        self.grid.corner_max(grid_cell)
    }
}

/// Draw the free coordinates of `point` from the grid's conditional density.
///
/// Fixed coordinates are left untouched. `cache` may be any cache used with this
/// grid, including one shared with full draws and other conditionings.
///
/// # Errors
///
/// See [`ConditionalView::new`]; additionally [`Error::SamplingExhausted`] if the
/// slice carries (almost) no mass. On error `point` is unchanged.
pub fn sample_conditional_with_rng<R: Rng + ?Sized>(
    grid: &Grid,
    point: &mut PartialPoint,
    sampler: &RejectionSampler,
    cache: &mut EnvelopeCache,
    rng: &mut R,
) -> Result<()> {
    let view = ConditionalView::new(grid, point)?;
    let drawn = sampler.sample_with_rng(&view, cache, rng)?;
    for (&axis, x) in view.free_axes().iter().zip(drawn) {
        point.values[axis] = x;
    }
    Ok(())
}
