//! Planar homography estimation.
//!
//! This crate provides:
//! - re-exports of the linear estimators (`planar-homography-core`) and the
//!   Levenberg-Marquardt refiner (`planar-homography-refine`)
//! - JSON configuration and correspondence files ([`HomographyConfig`],
//!   [`CorrespondenceFile`])
//! - [`estimate`], which runs the configured linear method, optionally
//!   refines the result, and reports reprojection statistics
//! - (feature `cli`) the `planar-homography` command-line tool
//!
//! ## Quickstart
//!
//! ```
//! use planar_homography::{estimate, EstimationMethod, HomographyConfig, RefineParams};
//! use nalgebra::Point2;
//!
//! let src: Vec<Point2<f64>> = (0..12)
//!     .map(|i| Point2::new((i % 4) as f64, (i / 4) as f64))
//!     .collect();
//! let dst: Vec<Point2<f64>> = src
//!     .iter()
//!     .map(|p| Point2::new(2.0 * p.x + 0.1 * p.y + 1.0, 1.5 * p.y - 2.0))
//!     .collect();
//!
//! let config = HomographyConfig {
//!     method: EstimationMethod::Dlt,
//!     refine: Some(RefineParams::default()),
//! };
//! let result = estimate(&src, &dst, &config)?;
//! assert!(result.reprojection.max < 1e-6);
//! # Ok::<(), planar_homography::HomographyError>(())
//! ```
//!
//! ## API map
//! - `planar_homography::core`: homography type, normalization, DLT and
//!   least-squares estimators, reprojection metrics, logging setup.
//! - `planar_homography::refine`: reprojection refinement and MINPACK-style
//!   termination codes.

pub use planar_homography_core as core;
pub use planar_homography_refine as refine;

pub use planar_homography_core::{
    estimate_homography_dlt, estimate_homography_least_squares, init_with_level, Correspondences,
    ErrorKind, Homography, HomographyError, NumericFailure, PreconditionViolation,
    ReprojectionStats,
};
pub use planar_homography_refine::{refine_homography, RefineParams, RefineReport};

mod estimate;
mod io;

pub use estimate::{estimate, estimate_from_file, EstimateError, HomographyEstimate, RefineSummary};
pub use io::{CorrespondenceFile, EstimationMethod, HomographyConfig, HomographyIoError};

/// Route `log` records into `tracing` and install a stderr fmt subscriber.
///
/// `RUST_LOG` takes precedence over `default_directive`.
#[cfg(feature = "tracing")]
pub fn init_tracing_with_log_bridge(default_directive: &str) {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_log::LogTracer::init();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
