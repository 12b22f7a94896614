//! Reprojection error metrics.

use crate::error::{check_correspondences, HomographyError};
use crate::homography::Homography;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Per-correspondence distance `|| H(source[i]) - target[i] ||`.
///
/// Points mapped to infinity get `f64::INFINITY`.
pub fn reprojection_errors(
    h: &Homography,
    source: &[Point2<f64>],
    target: &[Point2<f64>],
) -> Result<Vec<f64>, HomographyError> {
    check_correspondences(source.len(), target.len(), 0)?;
    Ok(source
        .iter()
        .zip(target.iter())
        .map(|(s, t)| match h.try_apply(*s) {
            Some(p) => (p - *t).norm(),
            None => f64::INFINITY,
        })
        .collect())
}

/// Sum of squared reprojection distances.
pub fn reprojection_cost(
    h: &Homography,
    source: &[Point2<f64>],
    target: &[Point2<f64>],
) -> Result<f64, HomographyError> {
    Ok(reprojection_errors(h, source, target)?
        .iter()
        .map(|e| e * e)
        .sum())
}

/// Summary of reprojection distances, in target units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReprojectionStats {
    pub count: usize,
    pub mean: f64,
    pub rms: f64,
    pub max: f64,
}

impl ReprojectionStats {
    pub fn from_errors(errors: &[f64]) -> Self {
        if errors.is_empty() {
            return Self::default();
        }
        let n = errors.len() as f64;
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let mut max = 0.0_f64;
        for &e in errors {
            sum += e;
            sum_sq += e * e;
            max = max.max(e);
        }
        Self {
            count: errors.len(),
            mean: sum / n,
            rms: (sum_sq / n).sqrt(),
            max,
        }
    }

    pub fn compute(
        h: &Homography,
        source: &[Point2<f64>],
        target: &[Point2<f64>],
    ) -> Result<Self, HomographyError> {
        Ok(Self::from_errors(&reprojection_errors(h, source, target)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;

    #[test]
    fn identity_has_offset_errors() {
        let src = [Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];
        let dst = [Point2::new(3.0, 4.0), Point2::new(1.0, 1.0)];
        let errs = reprojection_errors(&Homography::identity(), &src, &dst).expect("errors");
        assert_eq!(errs, vec![5.0, 0.0]);

        let stats = ReprojectionStats::from_errors(&errs);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.max, 5.0);
        assert!((stats.rms - 12.5_f64.sqrt()).abs() < 1e-15);

        let cost = reprojection_cost(&Homography::identity(), &src, &dst).expect("cost");
        assert_eq!(cost, 25.0);
    }

    #[test]
    fn points_at_infinity_are_infinite() {
        let h = Homography::new(Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, -1.0));
        let errs =
            reprojection_errors(&h, &[Point2::new(1.0, 0.0)], &[Point2::new(0.0, 0.0)]).unwrap();
        assert!(errs[0].is_infinite());
    }

    #[test]
    fn empty_stats_are_zero() {
        assert_eq!(ReprojectionStats::from_errors(&[]), ReprojectionStats::default());
    }
}
