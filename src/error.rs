//! Error types for sequence validation and alignment computation.

use std::collections::TryReserveError;

/// Errors from frame-sequence validation and alignment.
#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    /// Returned when a sequence with zero frames is provided.
    #[error("frame sequence must contain at least one frame")]
    EmptySequence,

    /// Returned when a frame dimension of zero is provided.
    #[error("frame dimension must be non-zero")]
    ZeroDimension,

    /// Returned when a flat buffer does not divide into whole frames.
    #[error("flat buffer of {len} values does not divide into frames of dimension {dim}")]
    PartialFrame {
        /// Total number of values in the buffer.
        len: usize,
        /// Requested frame dimension.
        dim: usize,
    },

    /// Returned when a row-per-frame input contains frames of differing lengths.
    #[error("frame {frame} has {found} values, expected {expected}")]
    RaggedFrame {
        /// Index of the offending frame.
        frame: usize,
        /// Dimension established by the first frame.
        expected: usize,
        /// Length of the offending frame.
        found: usize,
    },

    /// Returned when a sequence contains NaN, infinity, or negative infinity.
    #[error("non-finite value in frame {frame} at dimension {dim}")]
    NonFiniteValue {
        /// Frame containing the first non-finite value found.
        frame: usize,
        /// Coordinate of the first non-finite value within that frame.
        dim: usize,
    },

    /// Returned when the two sequences disagree on frame dimensionality.
    #[error("frame dimensions differ between sequences: {left} vs {right}")]
    DimensionMismatch {
        /// Dimension of the first sequence.
        left: usize,
        /// Dimension of the second sequence.
        right: usize,
    },

    /// Returned when the skip penalty is negative or non-finite.
    #[error("skip penalty must be finite and non-negative, got {value}")]
    InvalidPenalty {
        /// The rejected penalty value.
        value: f64,
    },

    /// Returned when reserving memory for the DP grid fails.
    ///
    /// Distinct from a no-match result, which is a valid [`Alignment`]
    /// with an empty path.
    ///
    /// [`Alignment`]: crate::Alignment
    #[error("failed to reserve memory for a DP grid of {cells} cells")]
    GridAllocation {
        /// Number of cells the grid needed.
        cells: usize,
        /// The underlying reservation failure.
        #[source]
        source: TryReserveError,
    },
}
