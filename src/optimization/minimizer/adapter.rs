//! Adapter that exposes a user `Objective` as an `argmin` problem.
//!
//! The solver iterates over unconstrained coordinates `u`; every evaluation
//! first maps `u` into the caller's bounded coordinates `x` through a
//! [`BoxMap`], evaluates the objective there, and chains exact gradients back
//! to `u`. If the objective has no gradient, we finite-difference the
//! composed cost `u ↦ f(x(u))`, so no chain rule is needed in that branch.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    minimizer::{
        bounds::BoxMap,
        finite_diff::run_fd_diff,
        traits::Objective,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// Bridges a user `Objective` to `argmin`'s `CostFunction` and `Gradient`.
#[derive(Debug)]
pub struct ArgMinAdapter<'a, F: Objective> {
    pub f: &'a F,
    pub data: &'a F::Data,
    pub map: BoxMap,
}

impl<'a, F: Objective> Clone for ArgMinAdapter<'a, F> {
    fn clone(&self) -> Self {
        Self { f: self.f, data: self.data, map: self.map.clone() }
    }
}

impl<'a, F: Objective> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate `f(x(u))`.
    ///
    /// # Errors
    /// Propagates any `OptError` from the user’s `value`, and returns
    /// `NonFiniteCost` if the value is NaN or infinite.
    fn cost(&self, u: &Self::Param) -> Result<Self::Output, Error> {
        let x = self.map.to_outer(u);
        let output = self.f.value(&x, self.data)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(output)
    }
}

impl<'a, F: Objective> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate the gradient of the composed cost at `u`.
    ///
    /// - With an exact objective gradient: validate it at `x(u)` and pull it
    ///   back through the box map.
    /// - Otherwise: central differences of the composed cost, retried with
    ///   forward differences if any evaluation failed or the result is not
    ///   finite.
    ///
    /// The FD closure must return `f64`, so the first error raised inside it
    /// is captured in `closure_err` and the closure returns `NaN`.
    fn gradient(&self, u: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = u.len();
        let x = self.map.to_outer(u);
        match self.f.grad(&x, self.data) {
            Ok(g) => {
                validate_grad(&g, dim)?;
                Ok(self.map.pull_gradient(u, &x, g))
            }
            Err(OptError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost_func = |u: &Theta| -> f64 {
                    match self.cost(u) {
                        Ok(val) => val,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            f64::NAN
                        }
                    }
                };
                let fd_grad = u.central_diff(&cost_func);
                if closure_err.borrow().is_some() || validate_grad(&fd_grad, dim).is_err() {
                    return Ok(run_fd_diff(u, &cost_func, &closure_err)?);
                }
                Ok(fd_grad)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl<'a, F: Objective> ArgMinAdapter<'a, F> {
    /// Construct a new adapter over a user `Objective`, its data, and a box map.
    pub fn new(f: &'a F, data: &'a F::Data, map: BoxMap) -> Self {
        Self { f, data, map }
    }
}
