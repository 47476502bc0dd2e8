//! High-level entry point for minimizing a user-provided `Objective` under
//! optional box bounds.
//!
//! This validates the inputs, builds the [`BoxMap`] for the configured
//! [`BoundStrategy`](super::BoundStrategy), selects an L-BFGS solver with
//! either Hager–Zhang or More–Thuente line search, and delegates the run to
//! `run_lbfgs`.
use crate::optimization::{
    errors::OptResult,
    minimizer::{
        MinimizeOutcome, Theta,
        adapter::ArgMinAdapter,
        bounds::BoxMap,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, MinimizerOptions, Objective},
        types::{Bound, FnEvalMap},
        validation::validate_initial_guess,
    },
};
use argmin::core::{TerminationReason, TerminationStatus};

/// Minimize `f(x)` subject to `low_i ≤ x_i ≤ high_i` using L-BFGS.
///
/// # Behavior
/// - Rejects non-finite entries in `x0`, then validates it via
///   `f.check(x0, data)`.
/// - Validates `bounds` (one `(low, high)` per variable, `low ≤ high`);
///   `None` means unbounded.
/// - Projects `x0` into the box; values exactly on a bound are nudged
///   inward under the `Transform` strategy.
/// - An empty `x0` is evaluated once and reported as converged without
///   running the solver.
///
/// # Errors
/// - Propagates any error from `f.check` and input validation.
/// - Propagates builder errors from `build_optimizer_*`.
/// - Propagates fatal runtime errors from `run_lbfgs` (non-finite cost or
///   gradient).
///
/// # Returns
/// A [`MinimizeOutcome`] whose `x_hat` lies inside the box.
pub fn minimize<F: Objective>(
    f: &F, x0: Theta, data: &F::Data, bounds: Option<&[Bound]>, opts: &MinimizerOptions,
) -> OptResult<MinimizeOutcome> {
    validate_initial_guess(&x0)?;
    f.check(&x0, data)?;
    let map = BoxMap::new(bounds, x0.len(), opts.bound_strategy)?;

    if x0.is_empty() {
        let value = f.value(&x0, data)?;
        return MinimizeOutcome::new(
            Some(x0),
            value,
            TerminationStatus::Terminated(TerminationReason::SolverConverged),
            0,
            FnEvalMap::new(),
            None,
        );
    }

    let u0 = map.to_inner(&x0);
    let problem = ArgMinAdapter::new(f, data, map);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(u0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(u0, opts, problem, solver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::{OptError, OptResult},
        minimizer::{
            traits::{BoundStrategy, Tolerances},
            types::{Cost, Grad},
        },
    };
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Unconstrained and bounded minimization of a shifted quadratic with
    //   both bound strategies and both line searches.
    // - Active-bound solutions (optimum outside the box).
    // - Fatal handling of non-finite objectives and rejection of bad inputs.
    // -------------------------------------------------------------------------

    struct Bowl;

    impl Objective for Bowl {
        type Data = Theta;
        fn value(&self, x: &Theta, c: &Theta) -> OptResult<Cost> {
            Ok((x - c).mapv(|d| d * d).sum())
        }
        fn check(&self, x: &Theta, c: &Theta) -> OptResult<()> {
            if x.len() != c.len() {
                return Err(OptError::InvalidObjectiveInput { reason: "length".to_string() });
            }
            Ok(())
        }
        fn grad(&self, x: &Theta, c: &Theta) -> OptResult<Grad> {
            Ok((x - c) * 2.0)
        }
    }

    fn opts(strategy: BoundStrategy, ls: LineSearcher) -> MinimizerOptions {
        let tols = Tolerances::new(Some(1e-10), None, Some(500)).expect("valid tolerances");
        MinimizerOptions::new(tols, ls, None).expect("valid options").with_bound_strategy(strategy)
    }

    #[test]
    fn unconstrained_bowl_reaches_center() {
        let c = array![1.0, -2.0, 0.5];
        let out = minimize(&Bowl, array![0.0, 0.0, 0.0], &c, None, &opts(BoundStrategy::Transform, LineSearcher::MoreThuente))
            .expect("minimize succeeds");
        assert!(out.converged, "status: {}", out.status);
        for i in 0..3 {
            assert_abs_diff_eq!(out.x_hat[i], c[i], epsilon = 1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // With the optimum outside the box, every strategy must stop inside the
    // box, at (or next to) the active bound, and keep interior coordinates
    // at their unconstrained optimum.
    //
    // Given
    // -----
    // - Center `(3, 0.25)`, bounds `[0, 1] × [0, 1]`.
    //
    // Expect
    // ------
    // - `x_hat[0] ≈ 1` (active upper bound), `x_hat[1] ≈ 0.25`, both in-box.
    fn active_bound_is_respected_by_both_strategies() {
        let c = array![3.0, 0.25];
        let bounds = [(0.0, 1.0), (0.0, 1.0)];
        for strategy in [BoundStrategy::Transform, BoundStrategy::Clamp] {
            for ls in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
                let out = minimize(&Bowl, array![0.5, 0.5], &c, Some(&bounds), &opts(strategy, ls))
                    .expect("minimize succeeds");
                assert!(out.x_hat.iter().all(|v| (0.0..=1.0).contains(v)));
                assert_abs_diff_eq!(out.x_hat[0], 1.0, epsilon = 1e-3);
                assert_abs_diff_eq!(out.x_hat[1], 0.25, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn pinned_slot_stays_at_its_bound() {
        let c = array![3.0, 3.0];
        let bounds = [(0.5, 0.5), (f64::NEG_INFINITY, f64::INFINITY)];
        let out = minimize(&Bowl, array![0.5, 0.0], &c, Some(&bounds), &opts(BoundStrategy::Transform, LineSearcher::MoreThuente))
            .expect("minimize succeeds");
        assert_eq!(out.x_hat[0], 0.5);
        assert_abs_diff_eq!(out.x_hat[1], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn non_finite_objective_is_fatal() {
        struct Nan;
        impl Objective for Nan {
            type Data = ();
            fn value(&self, _: &Theta, _: &()) -> OptResult<Cost> {
                Ok(f64::NAN)
            }
            fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
                Ok(())
            }
        }
        let err = minimize(&Nan, array![1.0], &(), None, &MinimizerOptions::default())
            .expect_err("NaN cost must abort");
        assert!(err.is_non_finite(), "unexpected error: {err}");
    }

    #[test]
    fn bad_inputs_are_rejected_before_running() {
        let c = array![0.0];
        let defaults = MinimizerOptions::default();
        assert!(matches!(
            minimize(&Bowl, array![f64::NAN], &c, None, &defaults),
            Err(OptError::InvalidInitialGuess { .. })
        ));
        assert!(matches!(
            minimize(&Bowl, array![0.0], &c, Some(&[(1.0, 0.0)]), &defaults),
            Err(OptError::InvalidBound { .. })
        ));
        assert!(matches!(
            minimize(&Bowl, array![0.0, 1.0], &c, None, &defaults),
            Err(OptError::InvalidObjectiveInput { .. })
        ));
    }

    #[test]
    fn empty_problem_is_evaluated_once() {
        let c = Theta::zeros(0);
        let out = minimize(&Bowl, Theta::zeros(0), &c, None, &MinimizerOptions::default())
            .expect("empty problem");
        assert!(out.converged);
        assert_eq!(out.value, 0.0);
        assert_eq!(out.iterations, 0);
    }
}
