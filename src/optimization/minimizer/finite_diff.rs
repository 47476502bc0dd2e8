//! minimizer::finite_diff — finite-difference gradients and gradient checks.
//!
//! Purpose
//! -------
//! Provide finite-difference gradient approximations with error capture and
//! validation, plus a gradient check that compares an objective's exact
//! gradient against central differences, so the rest of the crate never
//! calls the `finitediff` API directly.
//!
//! Key behaviors
//! -------------
//! - Compute forward-difference gradients with error capture and
//!   post-hoc validation via [`run_fd_diff`].
//! - Compare exact and numerical gradients via [`gradient_check`],
//!   reporting the worst absolute and relative discrepancy.
//!
//! Invariants & assumptions
//! ------------------------
//! - Any error raised by the objective during finite differencing is
//!   routed into the shared `closure_err` cell and treated as a hard failure.
//! - Gradients returned from this module satisfy [`validate_grad`].
//!
//! Downstream usage
//! ----------------
//! - The argmin adapter calls [`run_fd_diff`] when an [`Objective`] has no
//!   exact gradient and the central approximation failed.
//! - The action functional exposes [`gradient_check`] to audit its exact
//!   gradient at arbitrary points.
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{
        traits::Objective,
        types::{Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// run_fd_diff — forward-difference gradient with error capture and validation.
///
/// Parameters
/// ----------
/// - `theta`: point at which the gradient is approximated.
/// - `func`: objective closure; it is assumed to route evaluation errors into
///   `closure_err` and return `NaN` in that case.
/// - `closure_err`: shared error slot, cleared on entry and inspected after
///   the FD call.
///
/// Errors
/// ------
/// - The captured error, converted into `OptError`.
/// - `OptError::GradientDimMismatch` / `OptError::InvalidGradient` from
///   [`validate_grad`].
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    let dim = theta.len();
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, dim)?;
    Ok(fd_grad)
}

/// Exact versus numerical gradient at one point.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientCheck {
    pub exact: Grad,
    pub numerical: Grad,
    /// `max_i |exact_i − numerical_i|`.
    pub max_abs_err: f64,
    /// `max_i |exact_i − numerical_i| / max(1, |exact_i|)`.
    pub max_rel_err: f64,
}

/// gradient_check — compare `f.grad` with central differences of `f.value`.
///
/// Errors
/// ------
/// - `OptError::GradientNotImplemented` if the objective has no exact
///   gradient.
/// - Any error raised by `value`/`grad` at `x` or during differencing.
pub fn gradient_check<F: Objective>(f: &F, x: &Theta, data: &F::Data) -> OptResult<GradientCheck> {
    let exact = f.grad(x, data)?;
    validate_grad(&exact, x.len())?;

    let closure_err: RefCell<Option<OptError>> = RefCell::new(None);
    let func = |p: &Theta| -> f64 {
        match f.value(p, data) {
            Ok(v) => v,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };
    let numerical = x.central_diff(&func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&numerical, x.len())?;

    let mut max_abs_err = 0.0_f64;
    let mut max_rel_err = 0.0_f64;
    for (&e, &n) in exact.iter().zip(numerical.iter()) {
        let diff = (e - n).abs();
        max_abs_err = max_abs_err.max(diff);
        max_rel_err = max_rel_err.max(diff / e.abs().max(1.0));
    }
    Ok(GradientCheck { exact, numerical, max_abs_err, max_rel_err })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::minimizer::types::Cost;
    use argmin::core::ArgminError;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Forward-difference gradient computation with and without closure errors.
    // - Gradient checks for a correct and a deliberately wrong gradient.
    //
    // They intentionally DO NOT cover:
    // - End-to-end optimizer behavior (handled in `api` tests).
    // -------------------------------------------------------------------------

    #[test]
    fn run_fd_diff_quadratic_returns_valid_gradient() {
        // Arrange
        let theta: Theta = Array1::from(vec![0.0_f64, 1.0]);
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |x: &Theta| x.dot(x);

        // Act
        let grad = run_fd_diff(&theta, &f, &closure_err).expect("quadratic FD gradient");

        // Assert
        assert_eq!(grad.len(), theta.len());
        assert!(grad.iter().all(|v| v.is_finite()));
    }

    #[test]
    // Purpose
    // -------
    // Ensure that `run_fd_diff` propagates an error captured in `closure_err`
    // as an `OptError` via the `From<Error>` implementation.
    //
    // Given
    // -----
    // - An objective closure that writes an `ArgminError` into `closure_err`
    //   and returns `NaN`.
    //
    // Expect
    // ------
    // - `run_fd_diff` returns the mapped `OptError::NotImplemented`.
    fn run_fd_diff_closure_error_is_propagated() {
        // Arrange
        let theta: Theta = Array1::from(vec![1.0_f64]);
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_: &Theta| {
            let argmin_err = ArgminError::NotImplemented { text: "fd test".to_string() };
            closure_err.replace(Some(argmin_err.into()));
            f64::NAN
        };

        // Act
        let result = run_fd_diff(&theta, &f, &closure_err);

        // Assert
        assert_eq!(result, Err(OptError::NotImplemented { text: "fd test".to_string() }));
    }

    struct Rosenbrock {
        wrong: bool,
    }

    impl Objective for Rosenbrock {
        type Data = ();
        fn value(&self, x: &Theta, _: &()) -> OptResult<Cost> {
            Ok((1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2))
        }
        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }
        fn grad(&self, x: &Theta, _: &()) -> OptResult<Grad> {
            let d0 = -2.0 * (1.0 - x[0]) - 400.0 * x[0] * (x[1] - x[0] * x[0]);
            let d1 = 200.0 * (x[1] - x[0] * x[0]);
            Ok(if self.wrong { array![d0, 2.0 * d1] } else { array![d0, d1] })
        }
    }

    #[test]
    fn gradient_check_separates_correct_from_wrong_gradients() {
        let x = array![-0.7, 1.3];
        let good = gradient_check(&Rosenbrock { wrong: false }, &x, &()).expect("check runs");
        assert!(good.max_rel_err < 1e-6, "rel err {}", good.max_rel_err);

        let bad = gradient_check(&Rosenbrock { wrong: true }, &x, &()).expect("check runs");
        assert!(bad.max_rel_err > 0.1);
    }
}
