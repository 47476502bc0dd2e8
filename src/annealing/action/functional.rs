//! Action functional: weighted measurement mismatch plus weighted model
//! mismatch, with its exact gradient.
//!
//! Purpose
//! -------
//! Evaluate, for a candidate `(path, parameters)` packed in a full vector,
//!
//! `A = ME + FE`, where
//! - `ME = c_m · Σ_{n, i} RM_i (x[n·m, Lidx_i] − y[n, i])²` over every
//!   observation row `n` (model row `n·m` for `m` substeps), and
//! - `FE = c_f · Σ_intervals Σ_k RF_k r_k²` over the discretization
//!   residuals `r` of all `N_model − 1` intervals,
//!
//! and its gradient with respect to every path and parameter slot.
//!
//! Key behaviors
//! -------------
//! - Normalization constants: `Sum` uses `c_m = 1`, `c_f = 1/dt_model`;
//!   `Mean` uses `c_m = 1/(L·N_data)` (0 when `L = 0`) and
//!   `c_f = 1/(D·(N_model − 1))`.
//! - The measurement gradient is analytic. The model gradient runs one
//!   [`ForwardSweep`] per interval over the block `(x_n, x_{n+1}, p_n[, p_{n+1}])`
//!   and contracts the local Jacobian with `2·c_f·RF∘r`.
//! - As an [`Objective`], the functional maps the minimizer's free vector
//!   into a base full vector that holds fixed parameters and pinned slots.
//!   `Objective::Data` is the rung's per-component `RF`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Shapes are checked once in [`ActionFunctional::new`]; evaluation itself
//!   does not fail. A non-finite result is reported by the minimizer layer.
//! - `A ≥ 0` for finite inputs.
//!
//! Conventions
//! -----------
//! - Recorded components ([`ActionComponents`]) keep the RM weighting in the
//!   measurement term and drop the RF weighting from the model term, so the
//!   model-error plateau across rungs is directly visible.
use crate::annealing::{
    action::discretize::{Discretization, Stencil},
    core::{
        data::Observations, indices::MeasurementMap, layout::VariableLayout, options::Normalization,
    },
    errors::{AnnealError, AnnealResult},
    models::Dynamics,
};
use crate::autodiff::{Dual, ForwardSweep};
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{gradient_check, Cost, Grad, GradientCheck, Objective, Theta},
};
use ndarray::{Array1, ArrayView1};
use std::cell::RefCell;

/// Action value split into its recorded parts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionComponents {
    /// Full objective `ME + FE`.
    pub action: f64,
    /// RM-weighted, normalized measurement term.
    pub measurement_error: f64,
    /// Normalized model term without the RF weighting.
    pub model_error: f64,
}

impl ActionComponents {
    pub fn is_finite(&self) -> bool {
        self.action.is_finite() && self.measurement_error.is_finite() && self.model_error.is_finite()
    }
}

#[derive(Debug)]
struct Workspace {
    sweep: ForwardSweep,
    dual: Stencil<Dual>,
    plain: Stencil<f64>,
    block: Vec<f64>,
    r: Vec<f64>,
}

/// Action over one run's observations, layout and scheme.
#[derive(Debug)]
pub struct ActionFunctional<'a, M: Dynamics> {
    model: &'a M,
    scheme: Discretization,
    layout: &'a VariableLayout,
    observations: &'a Observations,
    lidx: &'a MeasurementMap,
    rm: Array1<f64>,
    substeps: usize,
    dt: f64,
    meas_scale: f64,
    model_scale: f64,
    base: RefCell<Array1<f64>>,
    work: RefCell<Workspace>,
}

impl<'a, M: Dynamics> ActionFunctional<'a, M> {
    /// Assemble the functional.
    ///
    /// `rm` holds one measurement precision per `Lidx` entry; `base` is a
    /// full vector whose non-free slots (fixed parameters, pinned entries)
    /// stay as given for every evaluation.
    ///
    /// # Errors
    /// [`AnnealError::ShapeMismatch`] when the model, layout, observations,
    /// `Lidx`, `rm`, `substeps` and `base` disagree.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        model: &'a M, scheme: Discretization, layout: &'a VariableLayout,
        observations: &'a Observations, lidx: &'a MeasurementMap, rm: Array1<f64>,
        substeps: usize, normalization: Normalization, base: Array1<f64>,
    ) -> AnnealResult<Self> {
        let (d, np) = (model.dim(), model.n_params());
        let n_data = observations.n_times();
        let n_model = (n_data - 1) * substeps.max(1) + 1;
        let mismatch = |what: &'static str, expected: Vec<usize>, found: Vec<usize>| {
            Err(AnnealError::ShapeMismatch { what, expected, found })
        };
        if layout.dim() != d || layout.n_params() != np || layout.n_times() != n_model {
            return mismatch(
                "variable layout",
                vec![n_model, d, np],
                vec![layout.n_times(), layout.dim(), layout.n_params()],
            );
        }
        if observations.n_observed() != lidx.len() {
            return mismatch(
                "observations",
                vec![n_data, lidx.len()],
                vec![n_data, observations.n_observed()],
            );
        }
        if rm.len() != lidx.len() {
            return mismatch("measurement precision", vec![lidx.len()], vec![rm.len()]);
        }
        if base.len() != layout.n_full() {
            return mismatch("base vector", vec![layout.n_full()], vec![base.len()]);
        }

        let dt = observations.dt() / substeps as f64;
        let l = lidx.len();
        let (meas_scale, model_scale) = match normalization {
            Normalization::Sum => (1.0, 1.0 / dt),
            Normalization::Mean => {
                let m = if l == 0 { 0.0 } else { 1.0 / (l * n_data) as f64 };
                (m, 1.0 / (d * (n_model - 1)) as f64)
            }
        };
        let p_block = if layout.is_time_varying() { 2 * np } else { np };
        let n_in = 2 * d + p_block;
        let work = Workspace {
            sweep: ForwardSweep::new(n_in, d),
            dual: Stencil::new(d, np),
            plain: Stencil::new(d, np),
            block: vec![0.0; n_in],
            r: vec![0.0; d],
        };
        Ok(Self {
            model,
            scheme,
            layout,
            observations,
            lidx,
            rm,
            substeps,
            dt,
            meas_scale,
            model_scale,
            base: RefCell::new(base),
            work: RefCell::new(work),
        })
    }

    pub fn layout(&self) -> &VariableLayout {
        self.layout
    }

    /// Model time step `dt_data / m`.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Free-variable values currently held by the base vector.
    pub fn free_vector(&self) -> Array1<f64> {
        self.layout.gather(self.base.borrow().view())
    }

    /// Copy `full` into the base vector.
    pub fn set_base(&self, full: &Array1<f64>) {
        self.base.borrow_mut().assign(full);
    }

    /// The base vector with `free` scattered into it.
    pub fn expand(&self, free: ArrayView1<f64>) -> Array1<f64> {
        let mut full = self.base.borrow().clone();
        self.layout.scatter(free, &mut full);
        full
    }

    fn time(&self, n: usize) -> f64 {
        self.observations.t0() + n as f64 * self.dt
    }

    fn fill_block(&self, full: ArrayView1<f64>, n: usize, block: &mut [f64]) {
        let (d, np) = (self.layout.dim(), self.layout.n_params());
        for k in 0..2 * d {
            block[k] = full[n * d + k];
        }
        let offset = self.layout.param_offset();
        let start = if self.layout.is_time_varying() { offset + n * np } else { offset };
        for (j, slot) in block[2 * d..].iter_mut().enumerate() {
            *slot = full[start + j];
        }
    }

    fn split_block<'z, S>(&self, z: &'z [S]) -> (&'z [S], &'z [S], &'z [S], &'z [S]) {
        let (d, np) = (self.layout.dim(), self.layout.n_params());
        let (x, p) = z.split_at(2 * d);
        let (x0, x1) = x.split_at(d);
        if self.layout.is_time_varying() {
            let (p0, p1) = p.split_at(np);
            (x0, x1, p0, p1)
        } else {
            (x0, x1, p, p)
        }
    }

    fn measured_slot(&self, n: usize, i: usize) -> usize {
        n * self.substeps * self.layout.dim() + self.lidx.indices()[i]
    }

    /// Action and its recorded components at a full vector.
    ///
    /// `rf` holds one model precision per state component.
    pub fn components(&self, full: ArrayView1<f64>, rf: &Array1<f64>) -> ActionComponents {
        let y = self.observations.values();
        let mut me = 0.0;
        for n in 0..self.observations.n_times() {
            for i in 0..self.lidx.len() {
                let diff = full[self.measured_slot(n, i)] - y[[n, i]];
                me += self.rm[i] * diff * diff;
            }
        }

        let mut work = self.work.borrow_mut();
        let Workspace { plain, block, r, .. } = &mut *work;
        let (mut weighted, mut raw) = (0.0, 0.0);
        for n in 0..self.layout.n_times() - 1 {
            self.fill_block(full, n, &mut block[..]);
            let (x0, x1, p0, p1) = self.split_block(&block[..]);
            self.scheme.residual(
                self.model,
                self.time(n),
                self.dt,
                x0,
                x1,
                p0,
                p1,
                &mut *plain,
                &mut r[..],
            );
            for (k, &rk) in r.iter().enumerate() {
                weighted += rf[k] * rk * rk;
                raw += rk * rk;
            }
        }

        let measurement_error = self.meas_scale * me;
        let model_term = self.model_scale * weighted;
        ActionComponents {
            action: measurement_error + model_term,
            measurement_error,
            model_error: self.model_scale * raw,
        }
    }

    /// Exact gradient with respect to every full-vector slot.
    pub fn gradient_full(&self, full: ArrayView1<f64>, rf: &Array1<f64>) -> Array1<f64> {
        let (d, np) = (self.layout.dim(), self.layout.n_params());
        let mut g = Array1::zeros(self.layout.n_full());

        let y = self.observations.values();
        for n in 0..self.observations.n_times() {
            for i in 0..self.lidx.len() {
                let slot = self.measured_slot(n, i);
                g[slot] += 2.0 * self.meas_scale * self.rm[i] * (full[slot] - y[[n, i]]);
            }
        }

        let offset = self.layout.param_offset();
        let time_varying = self.layout.is_time_varying();
        let mut work = self.work.borrow_mut();
        let Workspace { sweep, dual, block, .. } = &mut *work;
        for n in 0..self.layout.n_times() - 1 {
            self.fill_block(full, n, &mut block[..]);
            let t = self.time(n);
            let (r, jac) = sweep.value_and_jacobian(&block[..], |z, out| {
                let (x0, x1, p0, p1) = self.split_block(z);
                self.scheme.residual(self.model, t, self.dt, x0, x1, p0, p1, &mut *dual, out);
            });
            for (c, col) in jac.columns().into_iter().enumerate() {
                let mut acc = 0.0;
                for k in 0..d {
                    acc += rf[k] * r[k] * col[k];
                }
                let slot = if c < 2 * d {
                    n * d + c
                } else if time_varying {
                    offset + n * np + (c - 2 * d)
                } else {
                    offset + (c - 2 * d)
                };
                g[slot] += 2.0 * self.model_scale * acc;
            }
        }
        g
    }

    /// Compare the exact gradient with central differences at a free vector.
    pub fn gradient_check(&self, free: &Theta, rf: &Array1<f64>) -> OptResult<GradientCheck> {
        gradient_check(self, free, rf)
    }
}

impl<M: Dynamics> Objective for ActionFunctional<'_, M> {
    type Data = Array1<f64>;

    fn value(&self, x: &Theta, rf: &Array1<f64>) -> OptResult<Cost> {
        let mut base = self.base.borrow_mut();
        self.layout.scatter(x.view(), &mut base);
        Ok(self.components(base.view(), rf).action)
    }

    fn check(&self, x: &Theta, rf: &Array1<f64>) -> OptResult<()> {
        if x.len() != self.layout.n_free() {
            return Err(OptError::InvalidObjectiveInput {
                reason: format!("expected {} free variables, found {}", self.layout.n_free(), x.len()),
            });
        }
        if rf.len() != self.layout.dim() {
            return Err(OptError::InvalidObjectiveInput {
                reason: format!("expected {} model precisions, found {}", self.layout.dim(), rf.len()),
            });
        }
        Ok(())
    }

    fn grad(&self, x: &Theta, rf: &Array1<f64>) -> OptResult<Grad> {
        let mut base = self.base.borrow_mut();
        self.layout.scatter(x.view(), &mut base);
        let g = self.gradient_full(base.view(), rf);
        Ok(self.layout.gather(g.view()))
    }
}
