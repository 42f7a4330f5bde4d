//! Boundary-tolerant dynamic time warping over feature-frame sequences.
//!
//! Pure math library — zero I/O. Aligns two time-ordered sequences of
//! equal-dimension feature vectors (e.g. acoustic frames) by finding the
//! monotonic correspondence that minimizes cumulative Euclidean distance,
//! while allowing leading and trailing frames of either sequence to go
//! unmatched at a fixed per-frame skip penalty. A multi-resolution driver
//! keeps long inputs tractable by solving at half resolution and
//! re-solving inside a band projected around the coarse path.
//!
//! One call computes one alignment end to end with no shared state, so
//! independent alignments are freely parallelizable by the caller.
//!
//! ```
//! use framewarp::{BoundaryDtw, FrameSequence};
//!
//! let s = FrameSequence::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], 1)?;
//! let t = FrameSequence::new(vec![2.0, 3.0], 1)?;
//!
//! let dtw = BoundaryDtw::exhaustive(0.1)?;
//! let alignment = dtw.align(s.as_view(), t.as_view())?;
//!
//! assert!(alignment.is_match());
//! assert_eq!(alignment.matched_range_s(), Some(2..=3));
//! # Ok::<(), framewarp::AlignError>(())
//! ```

mod band;
mod coarsen;
mod distance;
mod dtw;
mod error;
mod frames;
mod multires;
mod path;

pub use band::{Band, ColumnSpan};
pub use dtw::{BoundaryDtw, SearchStrategy};
pub use error::AlignError;
pub use frames::{FrameSequence, FrameSequenceView};
pub use path::{Alignment, PathStep, WarpingPath};
