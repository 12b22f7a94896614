use nalgebra::{Matrix3, Point2, Vector3};
use serde::{Deserialize, Serialize};

/// Relative threshold below which `|det(H / ||H||)|` counts as singular.
pub(crate) const SINGULAR_DET_REL: f64 = 1e-12;

/// Planar projective transform `dst ~ H * src`, defined up to scale.
///
/// Serialized as a row-major `[[f64; 3]; 3]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f64; 3]; 3]", into = "[[f64; 3]; 3]")]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    pub fn from_array(rows: [[f64; 3]; 3]) -> Self {
        Self::new(Matrix3::from_row_slice(&[
            rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
            rows[2][1], rows[2][2],
        ]))
    }

    pub fn to_array(&self) -> [[f64; 3]; 3] {
        [
            [self.h[(0, 0)], self.h[(0, 1)], self.h[(0, 2)]],
            [self.h[(1, 0)], self.h[(1, 1)], self.h[(1, 2)]],
            [self.h[(2, 0)], self.h[(2, 1)], self.h[(2, 2)]],
        ]
    }

    /// Build from the 9 entries in row-major order.
    pub fn from_params(p: &[f64; 9]) -> Self {
        Self::new(Matrix3::from_row_slice(p))
    }

    /// The 9 entries in row-major order.
    pub fn to_params(&self) -> [f64; 9] {
        let mut out = [0.0; 9];
        for r in 0..3 {
            for c in 0..3 {
                out[3 * r + c] = self.h[(r, c)];
            }
        }
        out
    }

    /// Map a point, dividing by the homogeneous coordinate.
    #[inline]
    pub fn apply(&self, p: Point2<f64>) -> Point2<f64> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        let w = v[2];
        Point2::new(v[0] / w, v[1] / w)
    }

    /// Like [`Homography::apply`], but `None` when the point maps to infinity.
    #[inline]
    pub fn try_apply(&self, p: Point2<f64>) -> Option<Point2<f64>> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        let w = v[2];
        if w.abs() <= f64::EPSILON * v.norm() {
            return None;
        }
        let out = Point2::new(v[0] / w, v[1] / w);
        (out.x.is_finite() && out.y.is_finite()).then_some(out)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }

    /// Fix the free scale: `H[2][2] = 1` when that entry is representable,
    /// otherwise unit Frobenius norm.
    pub fn normalized(&self) -> Self {
        let n = self.h.norm();
        if !n.is_finite() || n <= 0.0 {
            return *self;
        }
        let s = self.h[(2, 2)];
        if s.abs() > 1e-12 * n {
            Self::new(self.h / s)
        } else {
            Self::new(self.h / n)
        }
    }

    /// Finite, non-zero and not (numerically) rank deficient.
    pub fn is_well_conditioned(&self) -> bool {
        if self.h.iter().any(|v| !v.is_finite()) {
            return false;
        }
        let n = self.h.norm();
        if n <= 0.0 {
            return false;
        }
        (self.h / n).determinant().abs() > SINGULAR_DET_REL
    }

    /// Compose: `self * other` (apply `other` first).
    pub fn compose(&self, other: &Homography) -> Self {
        Self::new(self.h * other.h)
    }
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[[f64; 3]; 3]> for Homography {
    fn from(rows: [[f64; 3]; 3]) -> Self {
        Self::from_array(rows)
    }
}

impl From<Homography> for [[f64; 3]; 3] {
    fn from(h: Homography) -> Self {
        h.to_array()
    }
}

impl From<Matrix3<f64>> for Homography {
    fn from(h: Matrix3<f64>) -> Self {
        Self::new(h)
    }
}
