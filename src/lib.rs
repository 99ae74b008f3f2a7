//! `latsample`: draw points from a weight grid read as a continuous density.
//!
//! Given one strictly increasing knot sequence per axis and a non-negative weight
//! at every lattice point, the density is the multilinear interpolant of the
//! weights over the grid's bounding box. Points are drawn from it by rejection
//! sampling against per-cell corner maxima, which are memoized as cells are
//! visited. Partially known points can be completed by drawing only their
//! missing coordinates from the conditional density.
//!
//! Exposed modules:
//! - `grid`: knot/weight validation, domain bounds, cell location.
//! - `density`: the multilinear evaluator (`LatticeDensity`).
//! - `envelope`: the per-cell ceiling cache.
//! - `rejection`: the propose/accept loop and its settings.
//! - `conditional`: partial points and conditional slices.
//! - `session`: a grid plus its envelope cache, for batches.
//!
//! ```
//! use latsample::draw_with_rng;
//! use ndarray::array;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let knots = vec![vec![0.0, 1.0, 2.0]];
//! let weights = array![0.0, 1.0, 0.0].into_dyn();
//! let pts = draw_with_rng(knots, weights, 100, &mut rng).unwrap();
//! assert!(pts.iter().all(|p| (0.0..=2.0).contains(&p[0])));
//! ```

#![forbid(unsafe_code)]

pub mod conditional;
pub mod density;
pub mod envelope;
pub mod error;
pub mod grid;
pub mod rejection;
pub mod session;

use ndarray::{Array2, ArrayD};
use rand::Rng;

pub use conditional::{sample_conditional_with_rng, ConditionalView, PartialPoint};
pub use density::LatticeDensity;
pub use envelope::EnvelopeCache;
pub use error::{Error, Result};
pub use grid::{Grid, Location};
pub use rejection::{RejectionSampler, SamplerConfig, DEFAULT_MAX_ATTEMPTS};
pub use session::Session;

/// Draw `count` independent points from the grid's interpolated density.
///
/// # Errors
///
/// Construction errors from [`Grid::new`], or [`Error::SamplingExhausted`].
pub fn draw(knots: Vec<Vec<f64>>, weights: ArrayD<f64>, count: usize) -> Result<Vec<Vec<f64>>> {
    let mut rng = rand::rng();
    draw_with_rng(knots, weights, count, &mut rng)
}

/// [`draw`] with a caller-supplied RNG.
pub fn draw_with_rng<R: Rng + ?Sized>(
    knots: Vec<Vec<f64>>,
    weights: ArrayD<f64>,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Vec<f64>>> {
    Session::new(Grid::new(knots, weights)?).draw_with_rng(count, rng)
}

/// Fill the missing coordinates of every slot in place.
///
/// The outer `Result` carries grid construction errors, which abort the call.
/// The inner vector holds one outcome per slot: a slot with nothing missing
/// reports [`Error::NoFreeAxes`], one with a fixed coordinate off the grid reports
/// [`Error::OutOfDomain`]. Failed slots are left unchanged; the rest are filled.
pub fn draw_into(
    slots: &mut [PartialPoint],
    knots: Vec<Vec<f64>>,
    weights: ArrayD<f64>,
) -> Result<Vec<Result<()>>> {
    let mut rng = rand::rng();
    draw_into_with_rng(slots, knots, weights, &mut rng)
}

/// [`draw_into`] with a caller-supplied RNG.
pub fn draw_into_with_rng<R: Rng + ?Sized>(
    slots: &mut [PartialPoint],
    knots: Vec<Vec<f64>>,
    weights: ArrayD<f64>,
    rng: &mut R,
) -> Result<Vec<Result<()>>> {
    let mut session = Session::new(Grid::new(knots, weights)?);
    Ok(session.draw_into_with_rng(slots, rng))
}

/// [`draw_into`] over a matrix with one slot per row and `NaN` for missing entries.
///
/// # Errors
///
/// Construction errors from [`Grid::new`], or [`Error::DimensionMismatch`] if the
/// column count differs from the number of axes.
pub fn draw_into_matrix(
    matrix: &mut Array2<f64>,
    knots: Vec<Vec<f64>>,
    weights: ArrayD<f64>,
) -> Result<Vec<Result<()>>> {
    let mut rng = rand::rng();
    draw_into_matrix_with_rng(matrix, knots, weights, &mut rng)
}

/// [`draw_into_matrix`] with a caller-supplied RNG.
pub fn draw_into_matrix_with_rng<R: Rng + ?Sized>(
    matrix: &mut Array2<f64>,
    knots: Vec<Vec<f64>>,
    weights: ArrayD<f64>,
    rng: &mut R,
) -> Result<Vec<Result<()>>> {
    let mut session = Session::new(Grid::new(knots, weights)?);
    if matrix.ncols() != session.grid().ndim() {
        return Err(Error::DimensionMismatch {
            expected: session.grid().ndim(),
            got: matrix.ncols(),
        });
    }

    let mut slots: Vec<PartialPoint> = matrix
        .rows()
        .into_iter()
        .map(|row| {
            let coords: Vec<Option<f64>> =
                row.iter().map(|&x| (!x.is_nan()).then_some(x)).collect();
            PartialPoint::from_options(&coords)
        })
        .collect();

    let outcomes = session.draw_into_with_rng(&mut slots, rng);
    for ((mut row, slot), outcome) in matrix.rows_mut().into_iter().zip(&slots).zip(&outcomes) {
        if outcome.is_ok() {
            for (x, &v) in row.iter_mut().zip(slot.values()) {
                *x = v;
            }
        }
    }
    Ok(outcomes)
}
