//! Multilinear density evaluation.
//!
//! The weight grid is read as a continuous surface: inside a cell, the density is
//! the multilinear interpolant of the cell's \(2^N\) corner weights,
//!
//! \[
//! f(x) = \sum_{c \in \{0,1\}^N} w_c \prod_{a=1}^{N} t_a^{c_a} (1 - t_a)^{1 - c_a},
//! \]
//!
//! where \(t_a\) is the fractional offset along axis \(a\). The weights of the sum
//! form a convex combination, so \(f\) is non-negative, continuous across cells,
//! and reproduces the grid exactly at lattice points. Because \(f\) is linear in
//! each coordinate separately, its maximum over a closed cell sits on a corner:
//! the corner maximum is an exact envelope for rejection sampling.

use crate::error::Result;
use crate::grid::{Grid, Location};

/// A density defined on a rectilinear lattice, multilinear inside each cell.
///
/// Implemented by [`Grid`] for the full joint density and by
/// [`ConditionalView`](crate::conditional::ConditionalView) for slices with some
/// axes held fixed. The rejection sampler only talks to this trait.
///
/// Ceilings are expressed in terms of the underlying grid: every cell of a
/// density lies inside one grid cell, and the largest weight on that grid cell's
/// corners bounds any slice through it. Densities over the same grid therefore
/// share one [`EnvelopeCache`](crate::envelope::EnvelopeCache).
pub trait LatticeDensity {
    /// Number of axes the density is defined over.
    fn ndim(&self) -> usize;

    /// `(min, max)` of one axis.
    fn bounds(&self, axis: usize) -> (f64, f64);

    /// Map a point to its cell and in-cell offsets.
    fn locate(&self, point: &[f64]) -> Result<Location>;

    /// Density at an already-located point.
    fn density_at(&self, location: &Location) -> f64;

    /// Write the grid cell containing `cell` into `out`, replacing its contents.
    fn grid_cell(&self, cell: &[usize], out: &mut Vec<usize>);

    /// Largest weight on the corners of a grid cell.
    fn grid_corner_max(&self, grid_cell: &[usize]) -> f64;

    /// Density at `point`.
    ///
    /// # Errors
    ///
    /// Whatever [`LatticeDensity::locate`] reports for points off the domain.
    fn density(&self, point: &[f64]) -> Result<f64> {
        let location = self.locate(point)?;
        Ok(self.density_at(&location))
    }
}

impl Grid {
    /// Multilinear interpolation inside `cell` at fractional `offsets`.
    pub(crate) fn interpolate(&self, cell: &[usize], offsets: &[f64]) -> f64 {
        self.interpolate_with(|axis| (cell[axis], offsets[axis]))
    }

    /// Multilinear interpolation with `(cell index, offset)` supplied per axis.
    ///
    /// Corners with an interpolation weight of exactly zero are skipped, so a point
    /// on a lattice node returns that node's weight bit-for-bit.
    pub(crate) fn interpolate_with(&self, at: impl Fn(usize) -> (usize, f64)) -> f64 {
        let n = self.ndim();
        let base: usize = (0..n).map(|axis| at(axis).0 * self.stride(axis)).sum();
        let mut acc = 0.0;
        for corner in 0..(1usize << n) {
            let mut w = 1.0;
            let mut idx = base;
            for axis in 0..n {
                let t = at(axis).1;
                if (corner >> axis) & 1 == 1 {
                    w *= t;
                    idx += self.stride(axis);
                } else {
                    w *= 1.0 - t;
                }
            }
            if w != 0.0 {
                acc += w * self.weight_flat(idx);
            }
        }
        acc
    }

    /// Largest of the \(2^N\) corner weights of `cell`.
    ///
    /// Exact maximum of the density on the closed cell.
    ///
    /// # Panics
    ///
    /// Panics if `cell` has the wrong length or an index past the last cell.
    pub fn corner_max(&self, cell: &[usize]) -> f64 {
        assert_eq!(cell.len(), self.ndim(), "corner_max: cell has wrong dimension");
        let base = self.flat_index(cell);
        let mut max = 0.0_f64;
        for corner in 0..(1usize << cell.len()) {
            let mut idx = base;
            for axis in 0..cell.len() {
                if (corner >> axis) & 1 == 1 {
                    idx += self.stride(axis);
                }
            }
            max = max.max(self.weight_flat(idx));
        }
        max
    }
}

impl LatticeDensity for Grid {
    fn ndim(&self) -> usize {
        Grid::ndim(self)
    }

    fn bounds(&self, axis: usize) -> (f64, f64) {
        Grid::bounds(self, axis)
    }

    fn locate(&self, point: &[f64]) -> Result<Location> {
        Grid::locate(self, point)
    }

    fn density_at(&self, location: &Location) -> f64 {
        self.interpolate(&location.cell, &location.offsets)
    }

    fn grid_cell(&self, cell: &[usize], out: &mut Vec<usize>) {
        out.clear();
        out.extend_from_slice(cell);
    }

    fn grid_corner_max(&self, grid_cell: &[usize]) -> f64 {
        self.corner_max(grid_cell)
    }
}
