//! Linear estimate, optional refinement, and a serializable report.

use crate::io::{CorrespondenceFile, EstimationMethod, HomographyConfig, HomographyIoError};
use log::{debug, warn};
use nalgebra::Point2;
use planar_homography_core::{
    estimate_homography_dlt, estimate_homography_least_squares, Homography, HomographyError,
    ReprojectionStats,
};
use planar_homography_refine::{refine_homography_points, RefineReport, REFINE_MIN_CORRESPONDENCES};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum EstimateError {
    #[error(transparent)]
    Io(#[from] HomographyIoError),
    #[error(transparent)]
    Homography(#[from] HomographyError),
}

/// Serializable digest of a [`RefineReport`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RefineSummary {
    /// MINPACK-style termination code.
    pub info: i32,
    pub converged: bool,
    pub termination: String,
    pub evaluations: usize,
    pub initial_cost: f64,
    pub final_cost: f64,
    /// Whether the refined matrix replaced the linear estimate.
    pub applied: bool,
}

impl RefineSummary {
    fn new(report: &RefineReport, applied: bool) -> Self {
        Self {
            info: report.info(),
            converged: report.converged(),
            termination: format!("{:?}", report.termination),
            evaluations: report.evaluations,
            initial_cost: report.initial_cost,
            final_cost: report.final_cost,
            applied,
        }
    }
}

/// Result of [`estimate`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HomographyEstimate {
    /// Final homography, scaled so `H[2][2] = 1` when possible.
    pub homography: Homography,
    pub method: EstimationMethod,
    /// Output of the linear estimator.
    pub initial: Homography,
    pub refinement: Option<RefineSummary>,
    /// Reprojection distances of `homography` over all correspondences.
    pub reprojection: ReprojectionStats,
}

fn linear_estimate(
    method: EstimationMethod,
    source: &[Point2<f64>],
    target: &[Point2<f64>],
) -> Result<Homography, HomographyError> {
    match method {
        EstimationMethod::Dlt => estimate_homography_dlt(source, target),
        EstimationMethod::LeastSquares => estimate_homography_least_squares(source, target),
    }
}

/// Estimate the homography mapping `source` onto `target` as configured.
///
/// Refinement runs only when `config.refine` is set and there are at least
/// [`REFINE_MIN_CORRESPONDENCES`] correspondences; otherwise the linear
/// estimate is kept. A refined matrix is adopted only if it does not raise
/// the reprojection cost.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(source, target, config), fields(n = source.len(), method = ?config.method))
)]
pub fn estimate(
    source: &[Point2<f64>],
    target: &[Point2<f64>],
    config: &HomographyConfig,
) -> Result<HomographyEstimate, HomographyError> {
    let initial = linear_estimate(config.method, source, target)?;
    let mut homography = initial;

    let refinement = match config.refine.as_ref() {
        Some(params) if source.len() >= REFINE_MIN_CORRESPONDENCES => {
            let report = refine_homography_points(source, target, &initial, params)?;
            let applied = report.final_cost.is_finite() && report.final_cost <= report.initial_cost;
            if applied {
                homography = report.homography;
            } else {
                warn!(
                    "discarding refinement: cost {:.3e} -> {:.3e}",
                    report.initial_cost, report.final_cost
                );
            }
            Some(RefineSummary::new(&report, applied))
        }
        Some(_) => {
            debug!(
                "skipping refinement: {} correspondences, need at least {}",
                source.len(),
                REFINE_MIN_CORRESPONDENCES
            );
            None
        }
        None => None,
    };

    let homography = homography.normalized();
    let reprojection = ReprojectionStats::compute(&homography, source, target)?;
    debug!(
        "estimated homography ({:?}): n={} rms={:.3e} max={:.3e}",
        config.method,
        source.len(),
        reprojection.rms,
        reprojection.max
    );

    Ok(HomographyEstimate {
        homography,
        method: config.method,
        initial,
        refinement,
        reprojection,
    })
}

/// Load a [`CorrespondenceFile`] and run [`estimate`] on it.
pub fn estimate_from_file(
    path: impl AsRef<Path>,
    config: &HomographyConfig,
) -> Result<HomographyEstimate, EstimateError> {
    let file = CorrespondenceFile::load_json(path)?;
    let (source, target) = file.to_points();
    Ok(estimate(&source, &target, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;
    use planar_homography_core::{ErrorKind, PreconditionViolation};
    use planar_homography_refine::RefineParams;

    fn scene(n: usize) -> (Vec<Point2<f64>>, Vec<Point2<f64>>, Homography) {
        let h = Homography::new(Matrix3::new(
            0.8, 0.1, 5.0, //
            -0.2, 1.1, -3.0, //
            0.001, 0.002, 1.0,
        ));
        let src: Vec<Point2<f64>> = (0..n)
            .map(|i| {
                let t = i as f64;
                Point2::new(50.0 * (0.7 * t).cos() + 10.0, 40.0 * (1.3 * t).sin())
            })
            .collect();
        let dst = src.iter().map(|&p| h.apply(p)).collect();
        (src, dst, h)
    }

    #[test]
    fn linear_only_estimate_reports_stats() {
        let (src, dst, _) = scene(8);
        let out = estimate(&src, &dst, &HomographyConfig::default()).unwrap();
        assert_eq!(out.method, EstimationMethod::Dlt);
        assert!(out.refinement.is_none());
        assert_eq!(out.reprojection.count, 8);
        assert!(out.reprojection.max < 1e-8);
        assert!((out.homography.h[(2, 2)] - 1.0).abs() < 1e-15);
    }

    #[test]
    fn refinement_is_skipped_for_small_sets() {
        let (src, dst, _) = scene(6);
        let config = HomographyConfig {
            method: EstimationMethod::LeastSquares,
            refine: Some(RefineParams::default()),
        };
        let out = estimate(&src, &dst, &config).unwrap();
        assert!(out.refinement.is_none());
        assert_eq!(out.method, EstimationMethod::LeastSquares);
    }

    #[test]
    fn refinement_summary_is_attached() {
        let (src, dst, gt) = scene(20);
        let config = HomographyConfig {
            method: EstimationMethod::Dlt,
            refine: Some(RefineParams::default()),
        };
        let out = estimate(&src, &dst, &config).unwrap();
        let summary = out.refinement.as_ref().expect("refinement ran");
        assert!(summary.final_cost <= summary.initial_cost);
        assert!(summary.applied);
        assert!(summary.evaluations > 0);

        let p = Point2::new(3.0, 4.0);
        assert!((out.homography.apply(p) - gt.apply(p)).norm() < 1e-6);
    }

    #[test]
    fn estimator_errors_pass_through() {
        let (src, dst, _) = scene(5);
        let err = estimate(&src, &dst[..4], &HomographyConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PreconditionViolation);
        assert!(matches!(
            err,
            HomographyError::PreconditionViolation(PreconditionViolation::LengthMismatch { .. })
        ));
    }
}
