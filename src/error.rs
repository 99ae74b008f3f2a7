//! Error types for grid sampling.

use thiserror::Error;

/// Errors raised while building a grid or drawing from it.
///
/// Construction-time variants (`ShapeMismatch`, `InvalidKnots`, `InvalidWeights`)
/// abort a whole session. The rest are per-point: in a batch they are reported for
/// the affected slot only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Weight grid shape does not match the knot sequence lengths.
    #[error("weight grid shape {got:?} does not match knot lengths {expected:?}")]
    ShapeMismatch {
        /// Knot sequence lengths, in axis order.
        expected: Vec<usize>,
        /// Shape of the supplied weights.
        got: Vec<usize>,
    },

    /// A knot sequence is too short, not strictly increasing, or not finite.
    #[error("invalid knots on axis {axis}: {reason}")]
    InvalidKnots {
        /// Offending axis.
        axis: usize,
        /// Human-readable cause.
        reason: String,
    },

    /// A weight is negative or non-finite, or every weight is zero.
    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    /// A coordinate lies outside its axis' knot range.
    #[error("coordinate {value} on axis {axis} is outside [{min}, {max}]")]
    OutOfDomain {
        /// Offending axis.
        axis: usize,
        /// Supplied coordinate.
        value: f64,
        /// Lower domain bound of the axis.
        min: f64,
        /// Upper domain bound of the axis.
        max: f64,
    },

    /// A point or slot has the wrong number of coordinates.
    #[error("expected {expected} coordinates, got {got}")]
    DimensionMismatch {
        /// Grid dimensionality.
        expected: usize,
        /// Supplied length.
        got: usize,
    },

    /// A conditional draw was requested with every axis fixed.
    #[error("no free axes to draw")]
    NoFreeAxes,

    /// The proposal loop hit its safety cap without accepting.
    #[error("rejection sampling exhausted after {attempts} proposals")]
    SamplingExhausted {
        /// Proposals made before giving up.
        attempts: u64,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
