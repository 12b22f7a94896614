//! Nonlinear refinement of planar homographies.
//!
//! Starting from a linear estimate (see `planar-homography-core`), the nine
//! entries of `H` are adjusted with Levenberg-Marquardt to minimize
//! `sum_i || dehomogenize(H * source[i]) - target[i] ||^2`.
//!
//! Every call owns its optimization context, so refinements on different
//! correspondence sets can run concurrently.
//!
//! ```
//! use nalgebra::{Matrix3, Point2};
//! use planar_homography_core::{estimate_homography_dlt, Correspondences, Homography};
//! use planar_homography_refine::{refine_homography, RefineParams};
//!
//! let truth = Homography::new(Matrix3::new(1.2, 0.1, 3.0, -0.05, 0.9, 1.0, 0.01, 0.02, 1.0));
//! let src: Vec<Point2<f64>> = (0..16)
//!     .map(|i| Point2::new((i % 4) as f64, (i / 4) as f64))
//!     .collect();
//! let dst: Vec<Point2<f64>> = src.iter().map(|&p| truth.apply(p)).collect();
//!
//! let initial = estimate_homography_dlt(&src, &dst)?;
//! let corr = Correspondences::new(&src, &dst)?;
//! let report = refine_homography(corr, &initial, &RefineParams::default())?;
//! assert!(report.final_cost <= report.initial_cost + 1e-12);
//! # Ok::<(), planar_homography_core::HomographyError>(())
//! ```

mod problem;
mod refine;

pub use levenberg_marquardt::TerminationReason;
pub use problem::{ReprojectionProblem, HOMOGRAPHY_PARAMS};
pub use refine::{
    minpack_info, refine_homography, refine_homography_points, RefineParams, RefineReport,
    REFINE_MIN_CORRESPONDENCES,
};
