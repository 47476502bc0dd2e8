//! Execution helper that runs an `argmin` solver on a bounded objective and
//! returns a crate-friendly [`MinimizeOutcome`].
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{
        Grad, MinimizeOutcome, MinimizerOptions, Objective, Theta, adapter::ArgMinAdapter,
        observer::BestPointTracker,
    },
};
use argmin::core::{CostFunction, Executor, IterState, Solver, State, observers::ObserverMode};
#[cfg(feature = "obs_slog")]
use argmin::core::Gradient;
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;

/// Run an `argmin` optimization for a bounded objective.
///
/// This is the shared runner used by both line-search variants. It wires up:
/// - the user objective via [`ArgMinAdapter`] (which owns the box map),
/// - the chosen `Solver` (L-BFGS with Hager–Zhang/More–Thuente),
/// - the initial point `u0` in solver coordinates,
/// - a [`BestPointTracker`] observer plus, behind `obs_slog`, a terminal
///   slog observer when `opts.verbose` is set,
/// - optional `max_iters` and wall-clock `timeout`,
///
/// then executes the solver and maps the best iterate back to the caller's
/// bounded coordinates.
///
/// # Failure handling
/// - Non-finite cost or gradient anywhere in the run is fatal and returned
///   as the corresponding [`OptError`].
/// - Any other backend error (for example a line search that cannot find an
///   acceptable step) ends the run early: the best point observed so far,
///   or `u0` if none was observed, is reported with `converged = false`.
///
/// # Returns
/// A [`MinimizeOutcome`] whose `x_hat` lies inside the configured box.
/// `grad_norm` is measured in solver coordinates.
pub fn run_lbfgs<'a, F, S>(
    u0: Theta, opts: &MinimizerOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<MinimizeOutcome>
where
    F: Objective,
    S: Solver<ArgMinAdapter<'a, F>, IterState<Theta, Grad, (), (), (), f64>> + Send + 'static,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&u0, &problem)?;
    }
    let fallback = problem.clone();
    let start = u0.clone();
    let tracker = BestPointTracker::new();

    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(u0));
    optimizer = optimizer.add_observer(tracker.clone(), ObserverMode::Always);
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }
    if let Some(timeout) = opts.timeout {
        optimizer = optimizer.timeout(timeout);
    }

    match optimizer.run() {
        Ok(result) => {
            let mut state = result.state().clone();
            let iterations = state.get_iter();
            let function_counts = state.get_func_counts().clone();
            let termination = state.get_termination_status().clone();
            let grad = state.take_gradient();
            let x_hat = state.take_best_param().map(|u| fallback.map.to_outer(&u));
            MinimizeOutcome::new(
                x_hat,
                state.get_best_cost(),
                termination,
                iterations,
                function_counts,
                grad,
            )
        }
        Err(err) => {
            let err = OptError::from(err);
            if err.is_non_finite() {
                return Err(err);
            }
            log::warn!("minimizer stopped early ({err}); reporting best point observed");
            let (u, cost, iter) = match tracker.best() {
                Some(best) => (best.param, best.cost, best.iter),
                None => {
                    let cost = fallback.cost(&start)?;
                    (start, cost, 0)
                }
            };
            MinimizeOutcome::interrupted(
                fallback.map.to_outer(&u),
                cost,
                iter,
                format!("Interrupted: {err}"),
            )
        }
    }
}

// ---- Helper Methods ----

#[cfg(feature = "obs_slog")]
fn log_initial_state<F>(u0: &Theta, problem: &ArgMinAdapter<'_, F>) -> OptResult<()>
where
    F: Objective,
{
    let c0 = problem.cost(u0)?;
    let g0n = problem.gradient(u0).ok().map(|g| g.l2_norm());

    log::info!(
        "init: cost(x0) = {:.6}{}",
        c0,
        g0n.map(|n| format!(", ||grad|| = {:.6}", n)).unwrap_or_default()
    );
    Ok(())
}
