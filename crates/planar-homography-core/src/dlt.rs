//! Normalized Direct Linear Transform.

use crate::error::{check_correspondences, HomographyError, NumericFailure};
use crate::homography::Homography;
use crate::normalize::normalize_points;
use log::{debug, warn};
use nalgebra::{DMatrix, Matrix3, Point2};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Minimum number of correspondences the DLT accepts.
pub const DLT_MIN_CORRESPONDENCES: usize = 4;

/// Second-smallest / largest singular value below which the null space is
/// considered more than one-dimensional.
const NULL_SPACE_GAP_MIN: f64 = 1e-10;

/// Assemble the `max(2N, 9) x 9` DLT coefficient matrix from normalized points.
///
/// With only 4 correspondences there are 8 equations; the extra zero row keeps
/// the matrix square so the thin SVD still carries the null vector.
fn dlt_design_matrix(src: &[Point2<f64>], dst: &[Point2<f64>]) -> DMatrix<f64> {
    let n = src.len();
    let rows = (2 * n).max(9);
    let mut a = DMatrix::<f64>::zeros(rows, 9);

    for (k, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
        let x = s.x;
        let y = s.y;
        let u = d.x;
        let v = d.y;

        // [ -x -y -1   0  0  0   u*x u*y u ]
        a[(2 * k, 0)] = -x;
        a[(2 * k, 1)] = -y;
        a[(2 * k, 2)] = -1.0;
        a[(2 * k, 6)] = u * x;
        a[(2 * k, 7)] = u * y;
        a[(2 * k, 8)] = u;

        // [ 0  0  0  -x -y -1   v*x v*y v ]
        a[(2 * k + 1, 3)] = -x;
        a[(2 * k + 1, 4)] = -y;
        a[(2 * k + 1, 5)] = -1.0;
        a[(2 * k + 1, 6)] = v * x;
        a[(2 * k + 1, 7)] = v * y;
        a[(2 * k + 1, 8)] = v;
    }

    a
}

/// Solve `A h = 0` for the unit vector `h` minimizing `||A h||`.
///
/// Fails when the singular value gap is too small to single out one
/// direction (degenerate configurations such as collinear points).
fn null_vector(a: DMatrix<f64>) -> Result<[f64; 9], HomographyError> {
    let svd = a.svd(false, true);
    let vt = svd.v_t.ok_or(NumericFailure::NonFiniteSolution)?;
    let sv = svd.singular_values;

    let mut order: Vec<usize> = (0..sv.len()).collect();
    order.sort_by(|&i, &j| sv[i].total_cmp(&sv[j]));
    let smallest = order[0];
    let second = order[1];
    let largest = order[order.len() - 1];

    let s_max = sv[largest];
    if !s_max.is_finite() || s_max <= 0.0 {
        return Err(NumericFailure::NonFiniteSolution.into());
    }
    let ratio = sv[second] / s_max;
    debug!(
        "dlt singular values: min={:.3e} second={:.3e} max={:.3e}",
        sv[smallest], sv[second], s_max
    );
    if ratio < NULL_SPACE_GAP_MIN {
        warn!("dlt null space is degenerate (ratio {ratio:.3e})");
        return Err(NumericFailure::DegenerateNullSpace { ratio }.into());
    }

    let row = vt.row(smallest);
    let mut h = [0.0; 9];
    for (dst, src) in h.iter_mut().zip(row.iter()) {
        *dst = *src;
    }
    if h.iter().any(|v| !v.is_finite()) {
        return Err(NumericFailure::NonFiniteSolution.into());
    }
    Ok(h)
}

/// Estimate `H` such that `target ~ H * source` with the normalized DLT.
///
/// Both point sets are Hartley-normalized, the homogeneous system is solved
/// via SVD, and the result is denormalized as `T_dst^-1 * H_n * T_src`.
/// The returned matrix has `H[2][2] = 1` when that entry is representable.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(source, target), fields(n = source.len()))
)]
pub fn estimate_homography_dlt(
    source: &[Point2<f64>],
    target: &[Point2<f64>],
) -> Result<Homography, HomographyError> {
    check_correspondences(source.len(), target.len(), DLT_MIN_CORRESPONDENCES)?;

    let (src_n, t_src) = normalize_points(source)?;
    let (dst_n, t_dst) = normalize_points(target)?;
    let t_dst_inv = t_dst
        .try_inverse()
        .ok_or(NumericFailure::SingularNormalization)?;

    let a = dlt_design_matrix(&src_n, &dst_n);
    let h = null_vector(a)?;
    let hn = Matrix3::<f64>::from_row_slice(&h);

    // Denormalize: H = T_dst^{-1} * H_n * T_src
    let estimate = Homography::new(t_dst_inv * hn * t_src);
    if !estimate.is_well_conditioned() {
        warn!("dlt produced a singular homography");
        return Err(NumericFailure::SingularHomography.into());
    }

    debug!("dlt estimated homography from {} points", source.len());
    Ok(estimate.normalized())
}
