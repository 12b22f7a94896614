//! Hartley-style point normalization.
//!
//! A point set is translated so its centroid sits at the origin and scaled
//! isotropically so the mean distance from the origin is `sqrt(2)`:
//!
//! ```text
//!     [ s  0  -s*cx ]
//! S = [ 0  s  -s*cy ]     x' = s * (x - c)
//!     [ 0  0    1   ]
//! ```

use crate::error::{HomographyError, PreconditionViolation};
use nalgebra::{Matrix3, Point2, Vector3};

fn similarity_from_stats(cx: f64, cy: f64, mean_dist: f64) -> Matrix3<f64> {
    let s = (2.0_f64).sqrt() / mean_dist;
    Matrix3::<f64>::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

/// Compute the normalizing similarity transform of a point set.
///
/// Fails with a precondition violation when the set is empty, contains
/// non-finite coordinates, or all points coincide.
pub fn similarity_transform(points: &[Point2<f64>]) -> Result<Matrix3<f64>, HomographyError> {
    if points.is_empty() {
        return Err(PreconditionViolation::EmptyPointSet.into());
    }
    if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(PreconditionViolation::NonFiniteCoordinates.into());
    }

    let n = points.len() as f64;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for p in points {
        cx += p.x;
        cy += p.y;
    }
    cx /= n;
    cy /= n;

    let mut mean_dist = 0.0;
    for p in points {
        let dx = p.x - cx;
        let dy = p.y - cy;
        mean_dist += (dx * dx + dy * dy).sqrt();
    }
    mean_dist /= n;

    if !mean_dist.is_finite() || mean_dist <= 0.0 {
        return Err(PreconditionViolation::CoincidentPoints.into());
    }

    Ok(similarity_from_stats(cx, cy, mean_dist))
}

/// Apply a 3x3 transform to each point in place.
///
/// Points are lifted to `(x, y, 1)` and replaced by the first two components
/// of `transform * p`. There is no division by the third component, so this
/// is meant for affine transforms such as the ones from
/// [`similarity_transform`]; use [`crate::Homography::apply`] for projective
/// mapping.
pub fn transform_points(
    points: &mut [Point2<f64>],
    transform: &Matrix3<f64>,
) -> Result<(), HomographyError> {
    if transform.iter().any(|v| !v.is_finite()) || transform.iter().all(|v| *v == 0.0) {
        return Err(PreconditionViolation::InvalidTransform.into());
    }

    for p in points.iter_mut() {
        let v = transform * Vector3::new(p.x, p.y, 1.0);
        p.x = v[0];
        p.y = v[1];
    }
    Ok(())
}

/// Normalize a copy of `points`, returning the normalized set and its transform.
pub fn normalize_points(
    points: &[Point2<f64>],
) -> Result<(Vec<Point2<f64>>, Matrix3<f64>), HomographyError> {
    let t = similarity_transform(points)?;
    let mut out = points.to_vec();
    transform_points(&mut out, &t)?;
    Ok((out, t))
}
