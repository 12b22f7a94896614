use crate::error::{check_correspondences, HomographyError};
use nalgebra::Point2;

/// Borrowed pair of equal-length point sequences: `source[i] <-> target[i]`.
#[derive(Clone, Copy, Debug)]
pub struct Correspondences<'a> {
    source: &'a [Point2<f64>],
    target: &'a [Point2<f64>],
}

impl<'a> Correspondences<'a> {
    /// Pair up two point sequences. Fails if their lengths differ.
    pub fn new(
        source: &'a [Point2<f64>],
        target: &'a [Point2<f64>],
    ) -> Result<Self, HomographyError> {
        check_correspondences(source.len(), target.len(), 0)?;
        Ok(Self { source, target })
    }

    pub fn source(&self) -> &'a [Point2<f64>] {
        self.source
    }

    pub fn target(&self) -> &'a [Point2<f64>] {
        self.target
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Fail with `TooFewCorrespondences` unless at least `required` pairs are present.
    pub fn require_at_least(&self, required: usize) -> Result<(), HomographyError> {
        check_correspondences(self.source.len(), self.target.len(), required)?;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a Point2<f64>, &'a Point2<f64>)> + 'a {
        let (source, target) = (self.source, self.target);
        source.iter().zip(target.iter())
    }
}
