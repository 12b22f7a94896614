use crate::problem::ReprojectionProblem;
use levenberg_marquardt::{LevenbergMarquardt, TerminationReason};
use log::{debug, warn};
use nalgebra::Point2;
use planar_homography_core::{Correspondences, Homography, HomographyError, PreconditionViolation};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// The refiner needs strictly more residuals than the 9 parameters.
pub const REFINE_MIN_CORRESPONDENCES: usize = 10;

/// Solver settings for [`refine_homography`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineParams {
    /// Relative tolerance used for both the cost reduction (`ftol`) and the
    /// parameter step (`xtol`).
    pub tolerance: f64,
    /// Evaluation budget factor; the solver stops after `patience * 10`
    /// residual evaluations.
    pub patience: usize,
}

impl Default for RefineParams {
    fn default() -> Self {
        Self {
            tolerance: f64::EPSILON.sqrt(),
            patience: 200,
        }
    }
}

impl RefineParams {
    pub fn validate(&self) -> Result<(), HomographyError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(PreconditionViolation::InvalidTolerance(self.tolerance).into());
        }
        if self.patience == 0 {
            return Err(PreconditionViolation::InvalidPatience.into());
        }
        Ok(())
    }
}

/// Outcome of a refinement run.
///
/// A report is returned whenever the inputs are valid, including when the
/// solver did not converge. Check [`RefineReport::converged`] or
/// [`RefineReport::info`] before trusting the result.
#[derive(Debug)]
pub struct RefineReport {
    pub homography: Homography,
    pub termination: TerminationReason,
    pub evaluations: usize,
    /// Sum of squared reprojection distances at the initial estimate.
    pub initial_cost: f64,
    /// Sum of squared reprojection distances at [`RefineReport::homography`].
    pub final_cost: f64,
}

impl RefineReport {
    /// Classic MINPACK `info` code of the termination, see [`minpack_info`].
    pub fn info(&self) -> i32 {
        minpack_info(&self.termination)
    }

    pub fn converged(&self) -> bool {
        self.termination.was_successful()
    }
}

/// Map a solver termination onto the MINPACK `lmder`/`lmdif` `info` code.
///
/// `0` improper input, `1..=3` converged (ftol, xtol, both), `4` orthogonal,
/// `5` evaluation budget exhausted, `6..=8` tolerance too small for ftol, xtol
/// and gtol respectively, `-1` user or numerical stop.
pub fn minpack_info(termination: &TerminationReason) -> i32 {
    match termination {
        TerminationReason::WrongDimensions(_)
        | TerminationReason::NoParameters
        | TerminationReason::NoResiduals => 0,
        TerminationReason::ResidualsZero => 1,
        TerminationReason::Converged { ftol, xtol } => match (*ftol, *xtol) {
            (true, true) => 3,
            (false, true) => 2,
            _ => 1,
        },
        TerminationReason::Orthogonal => 4,
        TerminationReason::LostPatience => 5,
        TerminationReason::NoImprovementPossible(which) => match *which {
            "xtol" => 7,
            "gtol" => 8,
            _ => 6,
        },
        TerminationReason::User(_) | TerminationReason::Numerical(_) => -1,
    }
}

/// Minimize the summed squared reprojection distance starting from `initial`.
///
/// All nine entries of `H` are free parameters; the returned homography is
/// not rescaled. Requires at least [`REFINE_MIN_CORRESPONDENCES`] finite
/// correspondences and a finite initial matrix.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(correspondences, initial, params), fields(n = correspondences.len()))
)]
pub fn refine_homography(
    correspondences: Correspondences<'_>,
    initial: &Homography,
    params: &RefineParams,
) -> Result<RefineReport, HomographyError> {
    correspondences.require_at_least(REFINE_MIN_CORRESPONDENCES)?;
    params.validate()?;
    if correspondences
        .iter()
        .any(|(s, t)| !(s.x.is_finite() && s.y.is_finite() && t.x.is_finite() && t.y.is_finite()))
    {
        return Err(PreconditionViolation::NonFiniteCoordinates.into());
    }
    if initial.h.iter().any(|v| !v.is_finite()) || initial.h.iter().all(|v| *v == 0.0) {
        return Err(PreconditionViolation::InvalidTransform.into());
    }

    let problem = ReprojectionProblem::new(correspondences, initial);
    let initial_cost = problem.cost();

    let lm = LevenbergMarquardt::new()
        .with_ftol(params.tolerance)
        .with_xtol(params.tolerance)
        .with_patience(params.patience);
    let (problem, report) = lm.minimize(problem);

    let mut homography = problem.homography();
    let mut final_cost = problem.cost();
    if !final_cost.is_finite() && initial_cost.is_finite() {
        warn!("refinement left a non-finite cost; keeping the initial homography");
        homography = *initial;
        final_cost = initial_cost;
    }

    let info = minpack_info(&report.termination);
    if report.termination.was_successful() {
        debug!(
            "refined homography: n={} evals={} info={} cost {:.3e} -> {:.3e}",
            correspondences.len(),
            report.number_of_evaluations,
            info,
            initial_cost,
            final_cost
        );
    } else {
        warn!(
            "refinement did not converge: {:?} (info={}, evals={})",
            report.termination, info, report.number_of_evaluations
        );
    }

    Ok(RefineReport {
        homography,
        termination: report.termination,
        evaluations: report.number_of_evaluations,
        initial_cost,
        final_cost,
    })
}

/// Slice form of [`refine_homography`].
pub fn refine_homography_points(
    source: &[Point2<f64>],
    target: &[Point2<f64>],
    initial: &Homography,
    params: &RefineParams,
) -> Result<RefineReport, HomographyError> {
    refine_homography(Correspondences::new(source, target)?, initial, params)
}
