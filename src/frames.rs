//! Feature-frame sequence types with validation guarantees.

use crate::error::AlignError;

/// Owned, validated sequence of feature frames.
///
/// Frames are stored as a flat row-major buffer of `len * dim` values.
/// Guaranteed non-empty with a positive frame dimension and all values finite.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    data: Vec<f64>,
    dim: usize,
}

impl FrameSequence {
    /// Create a sequence from a flat row-major buffer of `dim`-sized frames.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::ZeroDimension`] | `dim` is zero |
    /// | [`AlignError::EmptySequence`] | `data` is empty |
    /// | [`AlignError::PartialFrame`] | `data.len()` is not a multiple of `dim` |
    /// | [`AlignError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(data: Vec<f64>, dim: usize) -> Result<Self, AlignError> {
        validate(&data, dim)?;
        Ok(Self { data, dim })
    }

    /// Create a sequence from one row per frame.
    ///
    /// The frame dimension is taken from the first row; all rows must match it.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::EmptySequence`] | `frames` is empty |
    /// | [`AlignError::ZeroDimension`] | The first frame is empty |
    /// | [`AlignError::RaggedFrame`] | A later frame has a different length |
    /// | [`AlignError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn from_frames(frames: &[Vec<f64>]) -> Result<Self, AlignError> {
        let first = frames.first().ok_or(AlignError::EmptySequence)?;
        let dim = first.len();
        if dim == 0 {
            return Err(AlignError::ZeroDimension);
        }
        for (i, frame) in frames.iter().enumerate() {
            if frame.len() != dim {
                return Err(AlignError::RaggedFrame {
                    frame: i,
                    expected: dim,
                    found: frame.len(),
                });
            }
        }
        let data: Vec<f64> = frames.iter().flatten().copied().collect();
        Self::new(data, dim)
    }

    /// Create a sequence without validation. For internal use where the
    /// values are already known to be finite and whole-frame.
    pub(crate) fn new_unchecked(data: Vec<f64>, dim: usize) -> Self {
        debug_assert!(dim > 0 && !data.is_empty() && data.len() % dim == 0);
        Self { data, dim }
    }

    /// Borrow this sequence as a zero-copy view.
    #[must_use]
    pub fn as_view(&self) -> FrameSequenceView<'_> {
        FrameSequenceView {
            data: &self.data,
            dim: self.dim,
        }
    }

    /// Return the number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    /// Return true if the sequence has no frames.
    ///
    /// A [`FrameSequence`] constructed via [`FrameSequence::new`] is always
    /// non-empty, so this always returns `false` for valid instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return the number of values per frame.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return frame `i` as a slice of `dim` values.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    #[must_use]
    pub fn frame(&self, i: usize) -> &[f64] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Consume and return the flat inner buffer.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.data
    }
}

impl AsRef<[f64]> for FrameSequence {
    fn as_ref(&self) -> &[f64] {
        &self.data
    }
}

/// Borrowed, validated view into a frame sequence. Zero-copy reference.
#[derive(Debug, Clone, Copy)]
pub struct FrameSequenceView<'a> {
    data: &'a [f64],
    dim: usize,
}

impl<'a> FrameSequenceView<'a> {
    /// Create a view over a flat row-major buffer of `dim`-sized frames,
    /// with the same validation as [`FrameSequence::new`].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AlignError::ZeroDimension`] | `dim` is zero |
    /// | [`AlignError::EmptySequence`] | `data` is empty |
    /// | [`AlignError::PartialFrame`] | `data.len()` is not a multiple of `dim` |
    /// | [`AlignError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(data: &'a [f64], dim: usize) -> Result<Self, AlignError> {
        validate(data, dim)?;
        Ok(Self { data, dim })
    }

    /// Return the number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    /// Return true if the view has no frames.
    ///
    /// A [`FrameSequenceView`] constructed via [`FrameSequenceView::new`] is
    /// always non-empty, so this always returns `false` for valid instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return the number of values per frame.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return frame `i` as a slice of `dim` values.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    #[must_use]
    pub fn frame(&self, i: usize) -> &'a [f64] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Return the underlying flat buffer.
    #[must_use]
    pub fn as_slice(&self) -> &'a [f64] {
        self.data
    }
}

fn validate(data: &[f64], dim: usize) -> Result<(), AlignError> {
    if dim == 0 {
        return Err(AlignError::ZeroDimension);
    }
    if data.is_empty() {
        return Err(AlignError::EmptySequence);
    }
    if data.len() % dim != 0 {
        return Err(AlignError::PartialFrame {
            len: data.len(),
            dim,
        });
    }
    if let Some(index) = data.iter().position(|v| !v.is_finite()) {
        return Err(AlignError::NonFiniteValue {
            frame: index / dim,
            dim: index % dim,
        });
    }
    Ok(())
}
