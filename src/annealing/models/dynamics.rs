//! Dynamics trait, batch adapter and forward simulation.
//!
//! A model supplies its right-hand side once, generic over [`Scalar`], so the
//! same code evaluates plain `f64` batches and feeds exact local Jacobians to
//! the action gradient.
use crate::annealing::{
    core::{data::check_finite, params::ParameterSet},
    errors::{AnnealError, AnnealResult},
};
use crate::autodiff::Scalar;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Continuous-time vector field `dx/dt = f(t, x, p)`.
///
/// `rhs` must fill all `dim()` entries of `out` using only [`Scalar`]
/// arithmetic. Branching on `t` or on the component index is fine; branching
/// on the value of `x` or `p` breaks differentiation.
pub trait Dynamics {
    /// State dimension `D`.
    fn dim(&self) -> usize;

    /// Parameter count `Np`.
    fn n_params(&self) -> usize;

    fn rhs<S: Scalar>(&self, t: f64, x: &[S], p: &[S], out: &mut [S]);
}

/// Batch evaluation of a [`Dynamics`] model over path points.
#[derive(Debug, Clone)]
pub struct ModelAdapter<M> {
    model: M,
}

impl<M: Dynamics> ModelAdapter<M> {
    /// # Errors
    /// [`AnnealError::InvalidDimension`] if the model reports `D == 0`.
    pub fn new(model: M) -> AnnealResult<Self> {
        if model.dim() == 0 {
            return Err(AnnealError::InvalidDimension { dim: 0 });
        }
        Ok(Self { model })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn dim(&self) -> usize {
        self.model.dim()
    }

    pub fn n_params(&self) -> usize {
        self.model.n_params()
    }

    /// `f(t, x, p)` for a single point.
    pub fn eval(&self, t: f64, x: ArrayView1<f64>, p: ArrayView1<f64>) -> Array1<f64> {
        let x = x.to_vec();
        let p = p.to_vec();
        let mut out = vec![0.0; self.dim()];
        self.model.rhs(t, &x, &p, &mut out);
        Array1::from_vec(out)
    }

    /// `f` at every row of `x`: row `n` is evaluated at `times[n]` with the
    /// parameters in effect at time `n`.
    ///
    /// # Errors
    /// [`AnnealError::ShapeMismatch`] if `x` is not `[times.len(), D]` or the
    /// parameter set does not fit `Np` and the row count.
    pub fn eval_batch(
        &self, times: ArrayView1<f64>, x: ArrayView2<f64>, params: &ParameterSet,
    ) -> AnnealResult<Array2<f64>> {
        let (n, d) = (times.len(), self.dim());
        if x.shape() != [n, d] {
            return Err(AnnealError::ShapeMismatch {
                what: "state batch",
                expected: vec![n, d],
                found: x.shape().to_vec(),
            });
        }
        params.validate(self.n_params(), n)?;

        let mut out = Array2::zeros((n, d));
        let mut xbuf = vec![0.0; d];
        let mut fbuf = vec![0.0; d];
        for (i, mut row) in out.rows_mut().into_iter().enumerate() {
            for (dst, &src) in xbuf.iter_mut().zip(x.row(i).iter()) {
                *dst = src;
            }
            let p = params.at(i).to_vec();
            self.model.rhs(times[i], &xbuf, &p, &mut fbuf);
            for (dst, &src) in row.iter_mut().zip(fbuf.iter()) {
                *dst = src;
            }
        }
        Ok(out)
    }
}

/// Integrate `model` with classical RK4 from `x0` at `t0` for `n_points`
/// points spaced `dt` apart (row 0 is `x0`).
///
/// A time-varying parameter set needs `n_points` rows; the step from `n` to
/// `n + 1` uses row `n` at the start, their average at the midpoint and row
/// `n + 1` at the end.
///
/// # Errors
/// - [`AnnealError::ShapeMismatch`] for a wrong-length `x0` or parameter set.
/// - [`AnnealError::NonFiniteInput`] if the trajectory blows up.
pub fn simulate_rk4<M: Dynamics>(
    model: &M, x0: ArrayView1<f64>, params: &ParameterSet, t0: f64, dt: f64, n_points: usize,
) -> AnnealResult<Array2<f64>> {
    let d = model.dim();
    if x0.len() != d {
        return Err(AnnealError::ShapeMismatch {
            what: "initial state",
            expected: vec![d],
            found: vec![x0.len()],
        });
    }
    params.validate(model.n_params(), n_points)?;

    let mut path = Array2::zeros((n_points, d));
    if n_points == 0 {
        return Ok(path);
    }
    path.row_mut(0).assign(&x0);

    let mut x = x0.to_vec();
    let (mut k1, mut k2, mut k3, mut k4) = (vec![0.0; d], vec![0.0; d], vec![0.0; d], vec![0.0; d]);
    let mut tmp = vec![0.0; d];
    for n in 0..n_points - 1 {
        let t = t0 + n as f64 * dt;
        let p0 = params.at(n).to_vec();
        let p1 = params.at(n + 1).to_vec();
        let pm: Vec<f64> = p0.iter().zip(p1.iter()).map(|(a, b)| 0.5 * (a + b)).collect();

        model.rhs(t, &x, &p0, &mut k1);
        axpy(&x, 0.5 * dt, &k1, &mut tmp);
        model.rhs(t + 0.5 * dt, &tmp, &pm, &mut k2);
        axpy(&x, 0.5 * dt, &k2, &mut tmp);
        model.rhs(t + 0.5 * dt, &tmp, &pm, &mut k3);
        axpy(&x, dt, &k3, &mut tmp);
        model.rhs(t + dt, &tmp, &p1, &mut k4);

        for k in 0..d {
            x[k] += dt / 6.0 * (k1[k] + 2.0 * k2[k] + 2.0 * k3[k] + k4[k]);
        }
        for (dst, &src) in path.row_mut(n + 1).iter_mut().zip(x.iter()) {
            *dst = src;
        }
    }
    check_finite("simulated path", path.view())?;
    Ok(path)
}

fn axpy(x: &[f64], a: f64, y: &[f64], out: &mut [f64]) {
    for ((o, &xi), &yi) in out.iter_mut().zip(x.iter()).zip(y.iter()) {
        *o = xi + a * yi;
    }
}
