//! Reprojection residuals as a `levenberg_marquardt` problem.

use levenberg_marquardt::LeastSquaresProblem;
use nalgebra::{storage::Owned, DVector, Dyn, OMatrix, SVector, U9};
use planar_homography_core::{Correspondences, Homography};

/// Number of free parameters: the 9 entries of `H`, row-major.
pub const HOMOGRAPHY_PARAMS: usize = 9;

/// Optimization context of a single refinement call.
///
/// Borrows the caller's correspondences and owns the 9-entry parameter
/// buffer the solver iterates on. Each refinement builds its own context, so
/// independent refinements never share state.
#[derive(Clone, Debug)]
pub struct ReprojectionProblem<'a> {
    correspondences: Correspondences<'a>,
    params: SVector<f64, HOMOGRAPHY_PARAMS>,
}

/// Mapped point and its homogeneous denominator for one source point.
struct Projection {
    u: f64,
    v: f64,
    w: f64,
}

#[inline]
fn project(p: &SVector<f64, HOMOGRAPHY_PARAMS>, x: f64, y: f64) -> Option<Projection> {
    let w = p[6] * x + p[7] * y + p[8];
    let u = (p[0] * x + p[1] * y + p[2]) / w;
    let v = (p[3] * x + p[4] * y + p[5]) / w;
    (w != 0.0 && u.is_finite() && v.is_finite()).then_some(Projection { u, v, w })
}

impl<'a> ReprojectionProblem<'a> {
    pub fn new(correspondences: Correspondences<'a>, initial: &Homography) -> Self {
        Self {
            correspondences,
            params: SVector::from_row_slice(&initial.to_params()),
        }
    }

    /// Current parameters as a homography.
    pub fn homography(&self) -> Homography {
        let mut p = [0.0; HOMOGRAPHY_PARAMS];
        p.copy_from_slice(self.params.as_slice());
        Homography::from_params(&p)
    }

    pub fn correspondences(&self) -> Correspondences<'a> {
        self.correspondences
    }

    /// Sum of squared residuals, `f64::INFINITY` if any point maps to infinity.
    pub fn cost(&self) -> f64 {
        self.residuals()
            .map(|r| r.norm_squared())
            .unwrap_or(f64::INFINITY)
    }
}

impl LeastSquaresProblem<f64, Dyn, U9> for ReprojectionProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, U9>;
    type ParameterStorage = Owned<f64, U9>;

    fn set_params(&mut self, x: &SVector<f64, HOMOGRAPHY_PARAMS>) {
        self.params.copy_from(x);
    }

    fn params(&self) -> SVector<f64, HOMOGRAPHY_PARAMS> {
        self.params
    }

    /// `r_i = || dehomogenize(H * [x_i, y_i, 1]) - target_i ||`
    ///
    /// Measured in target image units, so the cost does not depend on the
    /// free scale of `H`.
    fn residuals(&self) -> Option<DVector<f64>> {
        let mut r = DVector::<f64>::zeros(self.correspondences.len());
        for (i, (s, t)) in self.correspondences.iter().enumerate() {
            let proj = project(&self.params, s.x, s.y)?;
            let eu = proj.u - t.x;
            let ev = proj.v - t.y;
            r[i] = (eu * eu + ev * ev).sqrt();
        }
        Some(r)
    }

    fn jacobian(&self) -> Option<OMatrix<f64, Dyn, U9>> {
        let n = self.correspondences.len();
        let mut jac = OMatrix::<f64, Dyn, U9>::zeros(n);
        for (i, (s, t)) in self.correspondences.iter().enumerate() {
            let (x, y) = (s.x, s.y);
            let proj = project(&self.params, x, y)?;
            let eu = proj.u - t.x;
            let ev = proj.v - t.y;
            let r = (eu * eu + ev * ev).sqrt();
            // The distance is not differentiable at zero; leave the row empty.
            if r <= f64::MIN_POSITIVE {
                continue;
            }

            let gu = eu / (r * proj.w);
            let gv = ev / (r * proj.w);
            let gw = -(eu * proj.u + ev * proj.v) / (r * proj.w);

            jac[(i, 0)] = gu * x;
            jac[(i, 1)] = gu * y;
            jac[(i, 2)] = gu;
            jac[(i, 3)] = gv * x;
            jac[(i, 4)] = gv * y;
            jac[(i, 5)] = gv;
            jac[(i, 6)] = gw * x;
            jac[(i, 7)] = gw * y;
            jac[(i, 8)] = gw;
        }
        Some(jac)
    }
}
