//! Sequence coarsening for the multi-resolution driver.

use crate::frames::{FrameSequence, FrameSequenceView};

/// Halve a sequence by averaging adjacent frame pairs elementwise.
///
/// The coarse sequence has `len / 2` frames; a trailing unpaired frame is
/// dropped. Requires at least two input frames.
pub(crate) fn half_resolution(s: FrameSequenceView<'_>) -> FrameSequence {
    debug_assert!(s.len() >= 2);
    let dim = s.dim();
    let half = s.len() / 2;
    let mut data = Vec::with_capacity(half * dim);

    for i in 0..half {
        let a = s.frame(2 * i);
        let b = s.frame(2 * i + 1);
        data.extend(a.iter().zip(b).map(|(x, y)| (x + y) / 2.0));
    }

    // Averages of finite values stay finite, so validation is not repeated.
    FrameSequence::new_unchecked(data, dim)
}
