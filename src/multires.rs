//! Multi-resolution alignment driver.
//!
//! Recursively halves both sequences until they are short enough to solve
//! exactly, then unwinds: each level projects the coarser level's path
//! into a band and re-solves inside it. Time and space stay linear in the
//! combined input length, at the price of an approximate optimum.

use tracing::debug;

use crate::band::Band;
use crate::coarsen::half_resolution;
use crate::dtw;
use crate::error::AlignError;
use crate::frames::FrameSequenceView;
use crate::path::Alignment;

/// Shortest length at which banding is worthwhile; below this the grid is
/// already small enough to solve exhaustively.
pub(crate) fn min_banded_len(radius: usize) -> usize {
    2 * (radius + 1) + 1
}

pub(crate) fn align(
    s: FrameSequenceView<'_>,
    t: FrameSequenceView<'_>,
    skip_penalty: f64,
    radius: usize,
) -> Result<Alignment, AlignError> {
    let min_len = min_banded_len(radius);
    if s.len() < min_len || t.len() < min_len {
        return dtw::solve(s, t, skip_penalty, None);
    }

    let coarse_s = half_resolution(s);
    let coarse_t = half_resolution(t);
    let approx = align(coarse_s.as_view(), coarse_t.as_view(), skip_penalty, radius)?;

    // An empty coarse path projects an empty band, so the refinement
    // below degenerates to the all-skip baseline without evaluating a cell.
    let band = Band::project(approx.path(), s.len(), t.len(), radius);
    debug!(
        n = s.len(),
        m = t.len(),
        coverage = band.coverage(),
        "refining inside projected band"
    );

    dtw::solve(s, t, skip_penalty, Some(&band))
}
