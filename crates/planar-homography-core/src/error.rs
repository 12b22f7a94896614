//! Error types shared by all estimators.

/// Coarse error category, useful when callers only need to branch on
/// "bad input" versus "input looked fine but the system is degenerate".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    PreconditionViolation,
    NumericFailure,
}

/// Malformed input detected before any numeric work happens.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum PreconditionViolation {
    #[error("correspondence length mismatch (source={source_len}, target={target_len})")]
    LengthMismatch {
        source_len: usize,
        target_len: usize,
    },
    #[error("need at least {required} correspondences, got {actual}")]
    TooFewCorrespondences { required: usize, actual: usize },
    #[error("point set is empty")]
    EmptyPointSet,
    #[error("points are coincident (mean distance to centroid is zero)")]
    CoincidentPoints,
    #[error("point coordinates must be finite")]
    NonFiniteCoordinates,
    #[error("transform must be finite and non-zero")]
    InvalidTransform,
    #[error("tolerance must be finite and >= 0, got {0}")]
    InvalidTolerance(f64),
    #[error("patience must be >= 1")]
    InvalidPatience,
}

/// A solvable-looking system that turned out to be singular or degenerate.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum NumericFailure {
    #[error("normal equations are singular or ill-conditioned")]
    SingularNormalEquations,
    #[error("null space is not one-dimensional (singular value ratio {ratio:.3e})")]
    DegenerateNullSpace { ratio: f64 },
    #[error("solution contains non-finite values")]
    NonFiniteSolution,
    #[error("estimated homography is singular")]
    SingularHomography,
    #[error("normalizing transform is not invertible")]
    SingularNormalization,
}

/// Errors returned by the homography estimators.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum HomographyError {
    #[error("precondition violated: {0}")]
    PreconditionViolation(#[from] PreconditionViolation),
    #[error("failure occurred calculating homography: {0}")]
    NumericFailure(#[from] NumericFailure),
}

impl HomographyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HomographyError::PreconditionViolation(_) => ErrorKind::PreconditionViolation,
            HomographyError::NumericFailure(_) => ErrorKind::NumericFailure,
        }
    }
}

/// Check that two correspondence slices pair up and hold at least `required` entries.
pub(crate) fn check_correspondences(
    source_len: usize,
    target_len: usize,
    required: usize,
) -> Result<(), PreconditionViolation> {
    if source_len != target_len {
        return Err(PreconditionViolation::LengthMismatch {
            source_len,
            target_len,
        });
    }
    if source_len < required {
        return Err(PreconditionViolation::TooFewCorrespondences {
            required,
            actual: source_len,
        });
    }
    Ok(())
}
