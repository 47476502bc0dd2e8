//! Discretization schemes: per-interval residuals linking consecutive path
//! points.
//!
//! Every scheme produces `r = x₁ − x₀ − dt·Φ(t, x₀, x₁, p₀, p₁)`, a length-`D`
//! residual that vanishes when the pair satisfies the scheme exactly:
//!
//! - `ForwardEuler`: `Φ = f₀`.
//! - `Trapezoidal`: `Φ = (f₀ + f₁) / 2`.
//! - `SimpsonHermite`: `Φ = (f₀ + 4 f_m + f₁) / 6`, with the cubic Hermite
//!   midpoint `x_m = (x₀ + x₁)/2 + dt/8 · (f₀ − f₁)` evaluated at
//!   `t + dt/2` with `p_m = (p₀ + p₁)/2`.
//! - `RungeKutta4`: classical RK4 increment from `x₀`, with `p_m` at both
//!   midpoint stages and `p₁` at the end stage.
//!
//! Residuals are generic over [`Scalar`], so the action functional runs the
//! same code for values (`f64`) and exact local Jacobians (`Dual`).
use crate::annealing::{
    core::params::ParameterSet,
    errors::{AnnealError, AnnealResult},
    models::Dynamics,
};
use crate::autodiff::Scalar;
use ndarray::{Array2, ArrayView2};
use std::str::FromStr;

/// Named discretization scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Discretization {
    ForwardEuler,
    Trapezoidal,
    #[default]
    SimpsonHermite,
    RungeKutta4,
}

impl FromStr for Discretization {
    type Err = AnnealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "forwardeuler" | "euler" => Ok(Discretization::ForwardEuler),
            "trapezoidal" | "trapezoid" => Ok(Discretization::Trapezoidal),
            "simpsonhermite" | "simpson" => Ok(Discretization::SimpsonHermite),
            "rungekutta4" | "rk4" => Ok(Discretization::RungeKutta4),
            _ => Err(AnnealError::UnknownName { what: "discretization", name: s.to_string() }),
        }
    }
}

/// Scratch buffers for one residual evaluation.
#[derive(Debug, Clone)]
pub struct Stencil<S> {
    f0: Vec<S>,
    f1: Vec<S>,
    fm: Vec<S>,
    f3: Vec<S>,
    xm: Vec<S>,
    pm: Vec<S>,
}

impl<S: Scalar> Stencil<S> {
    pub fn new(dim: usize, n_params: usize) -> Self {
        Self {
            f0: vec![S::zero(); dim],
            f1: vec![S::zero(); dim],
            fm: vec![S::zero(); dim],
            f3: vec![S::zero(); dim],
            xm: vec![S::zero(); dim],
            pm: vec![S::zero(); n_params],
        }
    }
}

impl Discretization {
    pub fn name(&self) -> &'static str {
        match self {
            Discretization::ForwardEuler => "ForwardEuler",
            Discretization::Trapezoidal => "Trapezoidal",
            Discretization::SimpsonHermite => "SimpsonHermite",
            Discretization::RungeKutta4 => "RungeKutta4",
        }
    }

    /// Residual of the interval `[t, t + dt]` written into `out`.
    ///
    /// `p0`/`p1` are the parameters at the interval's ends; pass the same
    /// slice twice for a constant set.
    #[allow(clippy::too_many_arguments)]
    pub fn residual<M: Dynamics, S: Scalar>(
        &self, model: &M, t: f64, dt: f64, x0: &[S], x1: &[S], p0: &[S], p1: &[S],
        st: &mut Stencil<S>, out: &mut [S],
    ) {
        let d = x0.len();
        match self {
            Discretization::ForwardEuler => {
                model.rhs(t, x0, p0, &mut st.f0);
                for k in 0..d {
                    out[k] = x1[k] - x0[k] - st.f0[k] * dt;
                }
            }
            Discretization::Trapezoidal => {
                model.rhs(t, x0, p0, &mut st.f0);
                model.rhs(t + dt, x1, p1, &mut st.f1);
                for k in 0..d {
                    out[k] = x1[k] - x0[k] - (st.f0[k] + st.f1[k]) * (0.5 * dt);
                }
            }
            Discretization::SimpsonHermite => {
                model.rhs(t, x0, p0, &mut st.f0);
                model.rhs(t + dt, x1, p1, &mut st.f1);
                midpoint_params(p0, p1, &mut st.pm);
                for k in 0..d {
                    st.xm[k] = (x0[k] + x1[k]) * 0.5 + (st.f0[k] - st.f1[k]) * (dt / 8.0);
                }
                model.rhs(t + 0.5 * dt, &st.xm, &st.pm, &mut st.fm);
                for k in 0..d {
                    out[k] = x1[k] - x0[k] - (st.f0[k] + st.fm[k] * 4.0 + st.f1[k]) * (dt / 6.0);
                }
            }
            Discretization::RungeKutta4 => {
                midpoint_params(p0, p1, &mut st.pm);
                // f0 = k1, fm = k2, f3 = k3, f1 = k4
                model.rhs(t, x0, p0, &mut st.f0);
                for k in 0..d {
                    st.xm[k] = x0[k] + st.f0[k] * (0.5 * dt);
                }
                model.rhs(t + 0.5 * dt, &st.xm, &st.pm, &mut st.fm);
                for k in 0..d {
                    st.xm[k] = x0[k] + st.fm[k] * (0.5 * dt);
                }
                model.rhs(t + 0.5 * dt, &st.xm, &st.pm, &mut st.f3);
                for k in 0..d {
                    st.xm[k] = x0[k] + st.f3[k] * dt;
                }
                model.rhs(t + dt, &st.xm, p1, &mut st.f1);
                for k in 0..d {
                    let incr = st.f0[k] + st.fm[k] * 2.0 + st.f3[k] * 2.0 + st.f1[k];
                    out[k] = x1[k] - x0[k] - incr * (dt / 6.0);
                }
            }
        }
    }

    /// `[N − 1, D]` residuals of a whole path sampled at `t0 + n·dt`.
    ///
    /// # Errors
    /// [`AnnealError::ShapeMismatch`] if `path` is not `[N, D]` with
    /// `N ≥ 1`, or the parameter set does not fit.
    pub fn path_residuals<M: Dynamics>(
        &self, model: &M, t0: f64, dt: f64, path: ArrayView2<f64>, params: &ParameterSet,
    ) -> AnnealResult<Array2<f64>> {
        let (n, d) = path.dim();
        if d != model.dim() || n == 0 {
            return Err(AnnealError::ShapeMismatch {
                what: "path",
                expected: vec![n.max(1), model.dim()],
                found: vec![n, d],
            });
        }
        params.validate(model.n_params(), n)?;

        let mut st = Stencil::new(d, model.n_params());
        let mut out = Array2::zeros((n - 1, d));
        let mut r = vec![0.0; d];
        for i in 0..n - 1 {
            let x0 = path.row(i).to_vec();
            let x1 = path.row(i + 1).to_vec();
            let p0 = params.at(i).to_vec();
            let p1 = params.at(i + 1).to_vec();
            self.residual(model, t0 + i as f64 * dt, dt, &x0, &x1, &p0, &p1, &mut st, &mut r);
            for (dst, &src) in out.row_mut(i).iter_mut().zip(r.iter()) {
                *dst = src;
            }
        }
        Ok(out)
    }
}

fn midpoint_params<S: Scalar>(p0: &[S], p1: &[S], pm: &mut [S]) {
    for ((m, &a), &b) in pm.iter_mut().zip(p0.iter()).zip(p1.iter()) {
        *m = (a + b) * 0.5;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annealing::models::{library::LinearDecay, simulate_rk4, Lorenz96};
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Name parsing, including aliases and separators.
    // - Residual size on exact trajectories, ordered by each scheme's accuracy.
    // - Exact agreement of the RK4 residual with the RK4 integrator.
    // -------------------------------------------------------------------------

    #[test]
    fn names_parse_with_aliases() {
        assert_eq!("Simpson-Hermite".parse::<Discretization>(), Ok(Discretization::SimpsonHermite));
        assert_eq!("trapezoidal".parse::<Discretization>(), Ok(Discretization::Trapezoidal));
        assert_eq!("RK4".parse::<Discretization>(), Ok(Discretization::RungeKutta4));
        assert_eq!("forward_euler".parse::<Discretization>(), Ok(Discretization::ForwardEuler));
        assert!("leapfrog".parse::<Discretization>().is_err());
        assert_eq!(Discretization::default(), Discretization::SimpsonHermite);
    }

    #[test]
    // Purpose
    // -------
    // On the exact exponential trajectory each scheme's residual shrinks
    // with its order of accuracy.
    //
    // Given
    // -----
    // - `x(t) = exp(-t)` sampled at dt = 0.1 over 11 points, k = 1.
    //
    // Expect
    // ------
    // - max |r|: Euler > Trapezoidal > SimpsonHermite, with SimpsonHermite
    //   below 1e-7.
    fn residuals_shrink_with_scheme_order() {
        // Arrange
        let model = LinearDecay::new(1);
        let params = ParameterSet::Constant(array![1.0]);
        let path = Array2::from_shape_fn((11, 1), |(n, _)| (-(n as f64) * 0.1).exp());
        let worst = |scheme: Discretization| {
            scheme
                .path_residuals(&model, 0.0, 0.1, path.view(), &params)
                .expect("valid path")
                .iter()
                .fold(0.0_f64, |m, r| m.max(r.abs()))
        };

        // Act
        let euler = worst(Discretization::ForwardEuler);
        let trap = worst(Discretization::Trapezoidal);
        let simpson = worst(Discretization::SimpsonHermite);

        // Assert
        assert!(euler > trap && trap > simpson);
        assert!(simpson < 1e-7);
    }

    #[test]
    fn rk4_residual_vanishes_on_rk4_trajectory() {
        let model = Lorenz96::new(6).expect("valid dimension");
        let params = ParameterSet::TimeVarying(Array2::from_shape_fn((8, 2), |(n, j)| {
            if j == 0 { 8.0 + 0.1 * n as f64 } else { 0.0 }
        }));
        let x0 = Array1::from_shape_fn(6, |k| 1.0 + 0.3 * k as f64);
        let path = simulate_rk4(&model, x0.view(), &params, 0.0, 0.01, 8).expect("finite path");

        let r = Discretization::RungeKutta4
            .path_residuals(&model, 0.0, 0.01, path.view(), &params)
            .expect("valid path");

        assert_eq!(r.shape(), &[7, 6]);
        for v in r.iter() {
            assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-12);
        }
    }
}
