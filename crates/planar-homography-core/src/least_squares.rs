//! Linear least-squares homography with `H[2][2]` fixed to 1.
//!
//! Unknowns `[h11 h12 h13 h21 h22 h23 h31 h32]`; each correspondence
//! `(x, y) -> (u, v)` contributes
//!
//! ```text
//! h11 x + h12 y + h13 - u h31 x - u h32 y = u
//! h21 x + h22 y + h23 - v h31 x - v h32 y = v
//! ```
//!
//! The parameterization cannot represent homographies whose true `H[2][2]`
//! is zero (the origin maps to the line at infinity). Use the DLT for those.

use crate::error::{check_correspondences, HomographyError, NumericFailure, PreconditionViolation};
use crate::homography::Homography;
use log::{debug, warn};
use nalgebra::{DMatrix, DVector, Matrix3, Point2};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Smallest LU pivot accepted on the equilibrated normal matrix (unit diagonal).
const PIVOT_MIN: f64 = 1e-13;

/// Pack the `2N x 8` matrix `A` and right-hand side `b` of `A h = b`.
fn pack_least_squares_system(
    src: &[Point2<f64>],
    dst: &[Point2<f64>],
) -> (DMatrix<f64>, DVector<f64>) {
    let n = src.len();
    let mut a = DMatrix::<f64>::zeros(2 * n, 8);
    let mut b = DVector::<f64>::zeros(2 * n);

    for (k, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
        let x = s.x;
        let y = s.y;
        let u = d.x;
        let v = d.y;

        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -x * u;
        a[(r0, 7)] = -y * u;
        b[r0] = u;

        let r1 = 2 * k + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -x * v;
        a[(r1, 7)] = -y * v;
        b[r1] = v;
    }

    (a, b)
}

/// Solve the symmetric normal equations `M x = rhs` by LU.
///
/// `M` is equilibrated to unit diagonal first so the pivot test measures rank
/// deficiency rather than the units of the input coordinates.
fn solve_normal_equations(
    m: &DMatrix<f64>,
    rhs: &DVector<f64>,
) -> Result<DVector<f64>, HomographyError> {
    let n = m.nrows();
    let mut d = DVector::<f64>::zeros(n);
    for i in 0..n {
        let mii = m[(i, i)];
        if !mii.is_finite() || mii <= 0.0 {
            return Err(NumericFailure::SingularNormalEquations.into());
        }
        d[i] = 1.0 / mii.sqrt();
    }

    let scaled = DMatrix::<f64>::from_fn(n, n, |r, c| m[(r, c)] * d[r] * d[c]);
    let lu = scaled.lu();

    let min_pivot = lu
        .u()
        .diagonal()
        .iter()
        .fold(f64::INFINITY, |acc, v| acc.min(v.abs()));
    debug!("least squares min equilibrated pivot: {min_pivot:.3e}");
    if min_pivot.is_nan() || min_pivot < PIVOT_MIN {
        return Err(NumericFailure::SingularNormalEquations.into());
    }

    let y = lu
        .solve(&rhs.component_mul(&d))
        .ok_or(NumericFailure::SingularNormalEquations)?;
    let x = y.component_mul(&d);
    if x.iter().any(|v| !v.is_finite()) {
        return Err(NumericFailure::NonFiniteSolution.into());
    }
    Ok(x)
}

/// Estimate `H` such that `target ~ H * source` by linear least squares.
///
/// Solves `(A^T A) h = A^T b` on the raw coordinates; the result always has
/// `H[2][2] = 1`. A singular or ill-conditioned system (e.g. all
/// correspondences identical) is reported as a numeric failure.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(source, target), fields(n = source.len()))
)]
pub fn estimate_homography_least_squares(
    source: &[Point2<f64>],
    target: &[Point2<f64>],
) -> Result<Homography, HomographyError> {
    check_correspondences(source.len(), target.len(), 1)?;
    if source
        .iter()
        .chain(target.iter())
        .any(|p| !p.x.is_finite() || !p.y.is_finite())
    {
        return Err(PreconditionViolation::NonFiniteCoordinates.into());
    }

    let (a, b) = pack_least_squares_system(source, target);
    let at = a.transpose();
    let ata = &at * &a;
    let atb = &at * &b;

    let h = solve_normal_equations(&ata, &atb).inspect_err(|e| {
        warn!("least squares homography failed: {e}");
    })?;

    let estimate = Homography::new(Matrix3::new(
        h[0], h[1], h[2], //
        h[3], h[4], h[5], //
        h[6], h[7], 1.0,
    ));

    debug!(
        "least squares estimated homography from {} points",
        source.len()
    );
    Ok(estimate)
}
