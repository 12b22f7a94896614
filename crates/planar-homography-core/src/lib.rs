//! Core types and linear estimators for planar homographies.
//!
//! Given two equal-length sequences of 2D points, `source[i] <-> target[i]`,
//! estimate the 3x3 projective transform `H` with `target ~ H * source`:
//!
//! - [`estimate_homography_dlt`]: Hartley-normalized DLT, SVD null-space solve.
//! - [`estimate_homography_least_squares`]: normal equations with `H[2][2] = 1`.
//!
//! Every entry point returns either a usable [`Homography`] or a typed
//! [`HomographyError`]; degenerate inputs never produce a matrix.
//! Nonlinear refinement lives in `planar-homography-refine`.
//!
//! ```
//! use nalgebra::Point2;
//! use planar_homography_core::estimate_homography_dlt;
//!
//! let src = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(0.0, 1.0),
//! ];
//! let dst = src.map(|p| Point2::new(2.0 * p.x + 1.0, 2.0 * p.y - 1.0));
//! let h = estimate_homography_dlt(&src, &dst)?;
//! let q = h.apply(Point2::new(0.5, 0.5));
//! assert!((q.x - 2.0).abs() < 1e-9 && q.y.abs() < 1e-9);
//! # Ok::<(), planar_homography_core::HomographyError>(())
//! ```

mod correspondence;
mod dlt;
mod error;
mod homography;
mod least_squares;
mod logger;
mod normalize;
mod reprojection;

pub use correspondence::Correspondences;
pub use dlt::{estimate_homography_dlt, DLT_MIN_CORRESPONDENCES};
pub use error::{ErrorKind, HomographyError, NumericFailure, PreconditionViolation};
pub use homography::Homography;
pub use least_squares::estimate_homography_least_squares;
pub use normalize::{normalize_points, similarity_transform, transform_points};
pub use reprojection::{reprojection_cost, reprojection_errors, ReprojectionStats};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
