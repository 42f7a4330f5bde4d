//! Boundary-tolerant DTW: public configuration and the banded DP solver.

use std::ops::Range;

use tracing::instrument;

use crate::band::Band;
use crate::distance::euclidean;
use crate::error::AlignError;
use crate::frames::FrameSequenceView;
use crate::multires;
use crate::path::{Alignment, PathStep, WarpingPath};

/// Search strategy for an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Evaluate the full n×m grid. Exact, quadratic in time and space.
    Exhaustive,

    /// Recursive coarse-to-fine banding. Linear in time and space; the
    /// result is an approximation whose quality grows with `radius`.
    MultiResolution {
        /// Band expansion radius, in coarse steps per dimension.
        radius: usize,
    },
}

/// Immutable alignment configuration. Thread-safe and copyable.
///
/// Unlike classic DTW, which matches both sequences end to end, this
/// solver may leave leading and trailing frames of either sequence
/// unmatched at a cost of `skip_penalty` per skipped frame. A penalty of
/// zero makes skipping free (any nonzero match cost loses to skipping
/// everything); an arbitrarily large penalty recovers whole-sequence
/// matching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryDtw {
    skip_penalty: f64,
    strategy: SearchStrategy,
}

impl BoundaryDtw {
    /// Create an exact solver configuration.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::InvalidPenalty`] | `skip_penalty` is negative or non-finite |
    pub fn exhaustive(skip_penalty: f64) -> Result<Self, AlignError> {
        Self::with_strategy(skip_penalty, SearchStrategy::Exhaustive)
    }

    /// Create a multi-resolution solver configuration.
    ///
    /// Inputs shorter than `2 * (radius + 1) + 1` frames are solved
    /// exactly; longer inputs are recursively halved and re-solved inside
    /// a band of `radius` coarse steps around the coarse path.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::InvalidPenalty`] | `skip_penalty` is negative or non-finite |
    pub fn multi_resolution(skip_penalty: f64, radius: usize) -> Result<Self, AlignError> {
        Self::with_strategy(skip_penalty, SearchStrategy::MultiResolution { radius })
    }

    fn with_strategy(skip_penalty: f64, strategy: SearchStrategy) -> Result<Self, AlignError> {
        if !skip_penalty.is_finite() || skip_penalty < 0.0 {
            return Err(AlignError::InvalidPenalty { value: skip_penalty });
        }
        Ok(Self { skip_penalty, strategy })
    }

    /// Return the per-frame skip penalty.
    #[must_use]
    pub fn skip_penalty(&self) -> f64 {
        self.skip_penalty
    }

    /// Return the search strategy.
    #[must_use]
    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    /// Align two frame sequences.
    ///
    /// Returns the minimum-cost warping path between a contiguous portion
    /// of `s` and a contiguous portion of `t`, charging `skip_penalty` for
    /// every unmatched leading or trailing frame. An empty path is the
    /// valid no-match result: skipping everything was cheaper than any
    /// correspondence, and the distance equals the all-skip baseline
    /// `skip_penalty * (s.len() + t.len())`.
    ///
    /// For fixed inputs and configuration the result is exactly
    /// reproducible; candidate ties are broken in a fixed documented order.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::DimensionMismatch`] | `s` and `t` disagree on frame dimension |
    /// | [`AlignError::GridAllocation`] | DP grid memory could not be reserved |
    #[instrument(skip(s, t), fields(n = s.len(), m = t.len()))]
    pub fn align(
        &self,
        s: FrameSequenceView<'_>,
        t: FrameSequenceView<'_>,
    ) -> Result<Alignment, AlignError> {
        if s.dim() != t.dim() {
            return Err(AlignError::DimensionMismatch {
                left: s.dim(),
                right: t.dim(),
            });
        }
        match self.strategy {
            SearchStrategy::Exhaustive => solve(s, t, self.skip_penalty, None),
            SearchStrategy::MultiResolution { radius } => {
                multires::align(s, t, self.skip_penalty, radius)
            }
        }
    }
}

/// Traceback tag for one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellMove {
    /// The path starts at this cell; every earlier frame of both
    /// sequences is skipped.
    Start,
    /// Extend from `(i-1, j-1)`, consuming a frame of each sequence.
    Diagonal,
    /// Extend from `(i, j-1)`, consuming only a frame of `t`.
    AdvanceT,
    /// Extend from `(i-1, j)`, consuming only a frame of `s`.
    AdvanceS,
}

/// Banded DP grid: cumulative costs and traceback tags for the cells
/// inside each row's span, stored row-contiguously.
///
/// Cell `(i, j)` maps to flat index `offsets[i] + (j - spans[i].start)`.
/// Only banded cells are allocated, so memory is proportional to the band
/// area rather than n×m.
struct Grid {
    spans: Vec<Range<usize>>,
    offsets: Vec<usize>,
    cost: Vec<f64>,
    moves: Vec<CellMove>,
}

impl Grid {
    fn new(n: usize, m: usize, band: Option<&Band>) -> Result<Self, AlignError> {
        if let Some(b) = band {
            debug_assert_eq!(b.len(), n);
            debug_assert_eq!(b.n_cols(), m);
        }

        let mut spans = Vec::with_capacity(n);
        let mut offsets = Vec::with_capacity(n + 1);
        let mut total = 0usize;
        offsets.push(0);
        for i in 0..n {
            let span = match band {
                Some(b) => b.row(i).range(),
                None => 0..m,
            };
            total += span.len();
            spans.push(span);
            offsets.push(total);
        }

        // The grid dominates memory; reserve fallibly so an oversized
        // allocation surfaces as an error instead of aborting.
        let mut cost = Vec::new();
        cost.try_reserve_exact(total)
            .map_err(|source| AlignError::GridAllocation { cells: total, source })?;
        cost.resize(total, f64::INFINITY);

        let mut moves = Vec::new();
        moves
            .try_reserve_exact(total)
            .map_err(|source| AlignError::GridAllocation { cells: total, source })?;
        moves.resize(total, CellMove::Start);

        Ok(Self { spans, offsets, cost, moves })
    }

    fn span(&self, i: usize) -> Range<usize> {
        self.spans[i].clone()
    }

    /// Cumulative cost at `(i, j)`, or +∞ when the cell is outside the band.
    fn get(&self, i: usize, j: usize) -> f64 {
        let span = &self.spans[i];
        if j < span.start || j >= span.end {
            return f64::INFINITY;
        }
        self.cost[self.offsets[i] + (j - span.start)]
    }

    fn set(&mut self, i: usize, j: usize, cost: f64, mv: CellMove) {
        let idx = self.offsets[i] + (j - self.spans[i].start);
        self.cost[idx] = cost;
        self.moves[idx] = mv;
    }

    fn mv(&self, i: usize, j: usize) -> CellMove {
        self.moves[self.offsets[i] + (j - self.spans[i].start)]
    }
}

/// Pick the lowest-cost candidate; strict comparison keeps the earliest
/// entry on ties, which fixes the traceback for reproducibility.
fn best_candidate(candidates: [(f64, CellMove); 4]) -> (f64, CellMove) {
    let mut best = candidates[0];
    for &candidate in &candidates[1..] {
        if candidate.0 < best.0 {
            best = candidate;
        }
    }
    best
}

/// Boundary-aware DP solve over the full or banded grid.
///
/// Fills the grid in row-major order. Each cell picks the cheapest of
/// starting fresh (paying the penalty for every skipped leading frame),
/// or extending diagonally, by a `t` frame, or by an `s` frame; cells
/// outside the band contribute +∞. A running minimum tracks the best
/// finish-here score — the cell cost plus the penalty for skipping all
/// remaining frames — seeded by the all-skip baseline. Only a strictly
/// better score counts as a match.
pub(crate) fn solve(
    s: FrameSequenceView<'_>,
    t: FrameSequenceView<'_>,
    skip_penalty: f64,
    band: Option<&Band>,
) -> Result<Alignment, AlignError> {
    let n = s.len();
    let m = t.len();
    let mut grid = Grid::new(n, m, band)?;

    let baseline = skip_penalty * (n + m) as f64;
    let mut best = baseline;
    let mut end: Option<(usize, usize)> = None;

    for i in 0..n {
        for j in grid.span(i) {
            let d = euclidean(s.frame(i), t.frame(j));

            let prev_diag = if i > 0 && j > 0 {
                grid.get(i - 1, j - 1)
            } else {
                f64::INFINITY
            };
            let prev_t = if j > 0 { grid.get(i, j - 1) } else { f64::INFINITY };
            let prev_s = if i > 0 { grid.get(i - 1, j) } else { f64::INFINITY };

            let (cost, mv) = best_candidate([
                (skip_penalty * (i + j) as f64 + d, CellMove::Start),
                (prev_diag + d, CellMove::Diagonal),
                (prev_t + d, CellMove::AdvanceT),
                (prev_s + d, CellMove::AdvanceS),
            ]);
            grid.set(i, j, cost, mv);

            // Finish-here score: end the path at (i, j) and skip the rest.
            let finish = cost + skip_penalty * ((n - 1 - i) + (m - 1 - j)) as f64;
            if finish < best {
                best = finish;
                end = Some((i, j));
            }
        }
    }

    let path = match end {
        None => WarpingPath::new(Vec::new()),
        Some((end_i, end_j)) => {
            let mut steps = Vec::new();
            let (mut i, mut j) = (end_i, end_j);
            loop {
                steps.push(PathStep { s: i, t: j });
                // The selected cost is always finite, so a non-Start move
                // points at a cell that was filled inside the band.
                match grid.mv(i, j) {
                    CellMove::Start => break,
                    CellMove::Diagonal => {
                        i -= 1;
                        j -= 1;
                    }
                    CellMove::AdvanceT => j -= 1,
                    CellMove::AdvanceS => i -= 1,
                }
            }
            steps.reverse();
            WarpingPath::new(steps)
        }
    };

    Ok(Alignment::new(best, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::FrameSequence;

    fn seq(values: &[f64]) -> FrameSequence {
        FrameSequence::new(values.to_vec(), 1).unwrap()
    }

    fn pairs(alignment: &Alignment) -> Vec<(usize, usize)> {
        alignment.path().steps().iter().map(|p| (p.s, p.t)).collect()
    }

    #[test]
    fn identity_alignment_is_free_diagonal() {
        let dtw = BoundaryDtw::exhaustive(0.5).unwrap();
        let a = seq(&[0.0, 1.0, 2.0]);
        let result = dtw.align(a.as_view(), a.as_view()).unwrap();
        assert!(result.distance().abs() < 1e-10);
        assert_eq!(pairs(&result), vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn matches_subsequence_in_the_middle() {
        // T = [2, 3] sits at s-indices 2..=3; the optimum matches it there
        // and pays the penalty for s-frames 0, 1 and 4: 3 * 0.1 = 0.3.
        let dtw = BoundaryDtw::exhaustive(0.1).unwrap();
        let s = seq(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let t = seq(&[2.0, 3.0]);
        let result = dtw.align(s.as_view(), t.as_view()).unwrap();
        assert!((result.distance() - 0.3).abs() < 1e-10);
        assert_eq!(pairs(&result), vec![(2, 0), (3, 1)]);
        assert_eq!(result.matched_range_s(), Some(2..=3));
        assert_eq!(result.matched_range_t(), Some(0..=1));
    }

    #[test]
    fn disjoint_sequences_return_all_skip_baseline() {
        let dtw = BoundaryDtw::exhaustive(0.1).unwrap();
        let s = seq(&[0.0, 1.0, 2.0]);
        let t = seq(&[10.0, 11.0, 12.0]);
        let result = dtw.align(s.as_view(), t.as_view()).unwrap();
        assert!(!result.is_match());
        assert!(result.path().is_empty());
        assert!((result.distance() - 0.6).abs() < 1e-10);
    }

    #[test]
    fn zero_penalty_never_matches() {
        // With a zero penalty the all-skip baseline is 0, and a finish
        // score must be strictly smaller to count, so even identical
        // sequences produce the empty path at distance 0.
        let dtw = BoundaryDtw::exhaustive(0.0).unwrap();
        let a = seq(&[0.0, 0.0]);
        let result = dtw.align(a.as_view(), a.as_view()).unwrap();
        assert!(!result.is_match());
        assert_eq!(result.distance(), 0.0);
    }

    #[test]
    fn all_frames_collapse_onto_single_frame() {
        let dtw = BoundaryDtw::exhaustive(1.0).unwrap();
        let s = seq(&[5.0; 10]);
        let t = seq(&[5.0]);
        let result = dtw.align(s.as_view(), t.as_view()).unwrap();
        assert!(result.distance().abs() < 1e-10);
        let expected: Vec<(usize, usize)> = (0..10).map(|i| (i, 0)).collect();
        assert_eq!(pairs(&result), expected);
    }

    #[test]
    fn candidate_order_breaks_ties() {
        // S = T = [0, 0] with penalty 1: at (1, 1) the diagonal, t-advance
        // and s-advance candidates all cost 0. The diagonal is considered
        // first and strict comparison keeps it.
        let dtw = BoundaryDtw::exhaustive(1.0).unwrap();
        let a = seq(&[0.0, 0.0]);
        let result = dtw.align(a.as_view(), a.as_view()).unwrap();
        assert_eq!(pairs(&result), vec![(0, 0), (1, 1)]);
        assert_eq!(result.distance(), 0.0);
    }

    #[test]
    fn banded_solve_matches_exhaustive_when_band_covers_optimum() {
        use crate::band::Band;
        use crate::path::{PathStep, WarpingPath};

        let a = seq(&[0.0, 1.0, 2.0, 3.0]);
        let coarse = WarpingPath::new(vec![PathStep { s: 0, t: 0 }, PathStep { s: 1, t: 1 }]);
        let band = Band::project(&coarse, 4, 4, 0);

        let banded = solve(a.as_view(), a.as_view(), 0.5, Some(&band)).unwrap();
        let full = solve(a.as_view(), a.as_view(), 0.5, None).unwrap();
        assert_eq!(banded, full);
        assert_eq!(pairs(&banded), vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn empty_band_evaluates_nothing() {
        use crate::band::Band;
        use crate::path::WarpingPath;

        // An empty coarse path projects to an empty band; the solve then
        // degenerates to the all-skip baseline even for identical inputs.
        let a = seq(&[0.0, 1.0, 2.0, 3.0]);
        let band = Band::project(&WarpingPath::new(vec![]), 4, 4, 1);
        let result = solve(a.as_view(), a.as_view(), 1.0, Some(&band)).unwrap();
        assert!(!result.is_match());
        assert_eq!(result.distance(), 8.0);
    }

    #[test]
    fn single_frame_pair_matches_when_penalty_dominates() {
        // d = 4 against a baseline of 2 * 3 = 6: matching wins.
        let dtw = BoundaryDtw::exhaustive(3.0).unwrap();
        let s = seq(&[1.0]);
        let t = seq(&[5.0]);
        let result = dtw.align(s.as_view(), t.as_view()).unwrap();
        assert!(result.is_match());
        assert!((result.distance() - 4.0).abs() < 1e-10);

        // Same frames with penalty 1: baseline 2 beats the match cost 4.
        let dtw = BoundaryDtw::exhaustive(1.0).unwrap();
        let result = dtw.align(s.as_view(), t.as_view()).unwrap();
        assert!(!result.is_match());
        assert!((result.distance() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn rejects_mismatched_dimensions() {
        let dtw = BoundaryDtw::exhaustive(1.0).unwrap();
        let s = FrameSequence::new(vec![1.0, 2.0], 2).unwrap();
        let t = FrameSequence::new(vec![1.0, 2.0], 1).unwrap();
        let result = dtw.align(s.as_view(), t.as_view());
        assert!(matches!(
            result,
            Err(AlignError::DimensionMismatch { left: 2, right: 1 })
        ));
    }

    #[test]
    fn rejects_invalid_penalty() {
        assert!(matches!(
            BoundaryDtw::exhaustive(-0.5),
            Err(AlignError::InvalidPenalty { .. })
        ));
        assert!(matches!(
            BoundaryDtw::multi_resolution(f64::NAN, 2),
            Err(AlignError::InvalidPenalty { .. })
        ));
    }

    #[test]
    fn strategy_accessors() {
        let exact = BoundaryDtw::exhaustive(0.5).unwrap();
        assert_eq!(exact.strategy(), SearchStrategy::Exhaustive);
        assert_eq!(exact.skip_penalty(), 0.5);

        let fast = BoundaryDtw::multi_resolution(0.5, 3).unwrap();
        assert_eq!(fast.strategy(), SearchStrategy::MultiResolution { radius: 3 });
    }

    #[test]
    fn multidimensional_frames() {
        // Two 2-d sequences matching exactly after a one-frame lead on s.
        let s = FrameSequence::new(vec![9.0, 9.0, 0.0, 1.0, 2.0, 3.0], 2).unwrap();
        let t = FrameSequence::new(vec![0.0, 1.0, 2.0, 3.0], 2).unwrap();
        let dtw = BoundaryDtw::exhaustive(0.25).unwrap();
        let result = dtw.align(s.as_view(), t.as_view()).unwrap();
        assert!((result.distance() - 0.25).abs() < 1e-10);
        assert_eq!(pairs(&result), vec![(1, 0), (2, 1)]);
    }
}
