//! Annealing controller: walks the beta ladder with warm starts.
//!
//! Purpose
//! -------
//! Own the path and parameter estimate for a whole run and drive one bounded
//! minimization per rung, raising the model precision `RF = RF0 ∘ α^β` from
//! rung to rung and seeding each rung with the previous optimum.
//!
//! Key behaviors
//! -------------
//! - States: `Initializing → Rung(i, β_i) → … → Converged`, or `Failed` on a
//!   numerical divergence, a minimizer failure, or a non-converged rung under
//!   the `Abort` policy.
//! - Setup (`anneal`): validate the initial guess, fix the variable layout,
//!   apply `init_to_data` to the data-aligned rows of the measured
//!   components, then project every free slot into its box (with a `warn!`
//!   when anything moved) and pin zero-width slots.
//! - Per rung: compute `RF`, notify the hook with the exact starting guess,
//!   minimize, write the optimum back, recompute the recorded components and
//!   append a [`RungResult`].
//!
//! Invariants & assumptions
//! ------------------------
//! - The rung `i + 1` starting vector is the rung `i` optimum, bit for bit,
//!   as handed to the minimizer and reported to the hook. Under
//!   `BoundStrategy::Transform` a slot that ended exactly on a finite bound
//!   re-enters the solver nudged inward by `BOUND_EPS` (scaled by the box),
//!   since the transform has no finite preimage there.
//! - Non-finite actions or gradients never reach the next rung; the run
//!   stops with `NumericalDivergence` and logs at `error!` first.
//! - Every recorded path and parameter set lies inside its bounds; the
//!   minimizer maps back into the box for both bound strategies.
//!
//! Conventions
//! -----------
//! - Logging: `debug!` for setup, `info!` once per rung, `warn!` for
//!   projected guesses and non-converged rungs, `error!` before returning a
//!   divergence.
use crate::annealing::{
    action::ActionFunctional,
    core::{
        data::{check_finite, Observations},
        indices::{MeasurementMap, ParamIndex},
        ladder::model_precision,
        layout::VariableLayout,
        options::{AnnealOptions, NonConvergencePolicy},
        params::ParameterSet,
    },
    errors::{AnnealError, AnnealResult},
    models::{Dynamics, ModelAdapter},
    results::{ResultStore, RungResult},
};
use crate::optimization::minimizer::{minimize, GradientCheck, MinimizerOptions, Tolerances};
use ndarray::{Array1, Array2, ArrayView2};

/// Observer of the ladder, called on entry to and exit from every rung.
///
/// Both methods default to no-ops.
pub trait RungHook {
    /// `path`/`params` are the exact starting guess handed to the minimizer.
    fn on_rung_start(
        &mut self, _index: usize, _beta: f64, _path: ArrayView2<f64>, _params: &ParameterSet,
    ) {
    }

    fn on_rung_end(&mut self, _index: usize, _result: &RungResult) {}
}

impl RungHook for () {}

/// Controller state.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnealState {
    Initializing,
    Rung { index: usize, beta: f64 },
    Converged,
    Failed { rung: usize, reason: String },
}

/// Variational annealing engine for one model and one observation set.
#[derive(Debug)]
pub struct Annealer<M: Dynamics> {
    model: ModelAdapter<M>,
    observations: Observations,
    lidx: MeasurementMap,
    pidx: ParamIndex,
    options: AnnealOptions,
    rm: Array1<f64>,
    rf0: Array1<f64>,
    state: AnnealState,
    results: ResultStore,
}

impl<M: Dynamics> Annealer<M> {
    /// Validate the configuration against the model and the data.
    ///
    /// # Errors
    /// - [`AnnealError::InvalidDimension`] for a zero-dimensional model.
    /// - [`AnnealError::IndexOutOfRange`] / [`AnnealError::DuplicateIndex`]
    ///   for bad `Lidx` or `Pidx`.
    /// - [`AnnealError::ShapeMismatch`] when the observation width differs
    ///   from `|Lidx|`, or precisions and bounds have the wrong length.
    /// - [`AnnealError::InvalidLadder`] when `RF0 · α^β` is not finite at the
    ///   last rung.
    /// - [`AnnealError::InvalidMinimizerOptions`] for tolerances or an
    ///   L-BFGS memory the minimizer would reject.
    pub fn new(
        model: M, observations: Observations, lidx: &[usize], pidx: &[usize], options: AnnealOptions,
    ) -> AnnealResult<Self> {
        let model = ModelAdapter::new(model)?;
        let (d, np) = (model.dim(), model.n_params());
        let lidx = MeasurementMap::new(lidx, d)?;
        let pidx = ParamIndex::new(pidx, np)?;
        if observations.n_observed() != lidx.len() {
            return Err(AnnealError::ShapeMismatch {
                what: "observations",
                expected: vec![observations.n_times(), lidx.len()],
                found: vec![observations.n_times(), observations.n_observed()],
            });
        }
        let rm = options.rm.resolve("measurement precision", lidx.len())?;
        let rf0 = options.rf0.resolve("model precision", d)?;
        let top = options.ladder.len().saturating_sub(1);
        let beta_max = options.ladder.betas().last().copied().unwrap_or(0.0);
        if !model_precision(&rf0, options.alpha, beta_max).iter().all(|r| r.is_finite()) {
            return Err(AnnealError::InvalidLadder {
                index: top,
                value: beta_max,
                reason: "model precision RF0 * alpha^beta overflows at this rung",
            });
        }
        options.bounds.check_dims(d, pidx.len())?;
        let tols = options.minimizer.tols;
        let tols = Tolerances::new(tols.tol_grad, tols.tol_cost, tols.max_iter)?;
        MinimizerOptions::new(tols, options.minimizer.line_searcher, options.minimizer.lbfgs_mem)?;

        log::debug!(
            "annealer configured: D={d}, Np={np}, L={}, |Pidx|={}, N_data={}, m={}, scheme={}, rungs={}",
            lidx.len(),
            pidx.len(),
            observations.n_times(),
            options.model_substeps,
            options.discretization.name(),
            options.ladder.len()
        );
        Ok(Self {
            model,
            observations,
            lidx,
            pidx,
            options,
            rm,
            rf0,
            state: AnnealState::Initializing,
            results: ResultStore::new(),
        })
    }

    pub fn options(&self) -> &AnnealOptions {
        &self.options
    }

    pub fn observations(&self) -> &Observations {
        &self.observations
    }

    pub fn state(&self) -> &AnnealState {
        &self.state
    }

    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    pub fn into_results(self) -> ResultStore {
        self.results
    }

    /// Model time points `N_model = (N_data − 1)·m + 1`.
    pub fn n_model_times(&self) -> usize {
        (self.observations.n_times() - 1) * self.options.model_substeps + 1
    }

    /// Model time step `dt_data / m`.
    pub fn dt_model(&self) -> f64 {
        self.observations.dt() / self.options.model_substeps as f64
    }

    /// Model time grid starting at the first observation time.
    pub fn model_times(&self) -> Array1<f64> {
        let (t0, dt) = (self.observations.t0(), self.dt_model());
        Array1::from_shape_fn(self.n_model_times(), |n| t0 + n as f64 * dt)
    }

    fn check_guess(&self, x0: ArrayView2<f64>, p0: &ParameterSet) -> AnnealResult<()> {
        let expected = [self.n_model_times(), self.model.dim()];
        if x0.shape() != expected {
            return Err(AnnealError::ShapeMismatch {
                what: "initial path",
                expected: expected.to_vec(),
                found: x0.shape().to_vec(),
            });
        }
        check_finite("initial path", x0)?;
        p0.validate(self.model.n_params(), self.n_model_times())
    }

    /// Run the full ladder from `(x0, p0)`.
    ///
    /// `x0` is `[N_model, D]`; `p0` supplies every parameter, and only `Pidx`
    /// slots are optimized.
    ///
    /// # Errors
    /// Configuration errors for a malformed guess; `NumericalDivergence`,
    /// `OptimizationFailed` or (under `Abort`) `RungNotConverged` at run time.
    /// Rungs finished before a runtime error stay in [`results`](Self::results).
    pub fn anneal(&mut self, x0: Array2<f64>, p0: ParameterSet) -> AnnealResult<&ResultStore> {
        self.anneal_with_hook(x0, p0, &mut ())
    }

    /// [`anneal`](Self::anneal) with a [`RungHook`] notified around every rung.
    pub fn anneal_with_hook<H: RungHook>(
        &mut self, x0: Array2<f64>, p0: ParameterSet, hook: &mut H,
    ) -> AnnealResult<&ResultStore> {
        self.state = AnnealState::Initializing;
        self.results = ResultStore::new();
        self.check_guess(x0.view(), &p0)?;

        let layout = VariableLayout::new(
            self.n_model_times(),
            self.model.dim(),
            &p0,
            &self.pidx,
            &self.options.bounds,
        )?;
        let mut full = layout.pack(x0.view(), &p0);
        if self.options.init_to_data {
            self.overwrite_measured(&mut full);
        }
        let moved = layout.project(&mut full);
        if moved > 0 {
            log::warn!("{moved} initial-guess entries lay outside their bounds and were projected");
        }
        log::debug!(
            "layout: {} free variables, {} pinned slots, {} full slots",
            layout.n_free(),
            layout.pinned().len(),
            layout.n_full()
        );

        let functional = ActionFunctional::new(
            self.model.model(),
            self.options.discretization,
            &layout,
            &self.observations,
            &self.lidx,
            self.rm.clone(),
            self.options.model_substeps,
            self.options.normalization,
            full.clone(),
        )?;

        for (index, &beta) in self.options.ladder.betas().iter().enumerate() {
            self.state = AnnealState::Rung { index, beta };
            let rf = model_precision(&self.rf0, self.options.alpha, beta);

            let (path0, params0) = layout.unpack(full.view());
            hook.on_rung_start(index, beta, path0.view(), &params0);

            let free0 = layout.gather(full.view());
            let outcome = match minimize(
                &functional,
                free0,
                &rf,
                Some(layout.free_bounds()),
                &self.options.minimizer,
            ) {
                Ok(outcome) => outcome,
                Err(err) => {
                    let err = AnnealError::from_rung(index, beta, err);
                    log::error!("rung {index} (beta = {beta}) failed: {err}");
                    self.state = AnnealState::Failed { rung: index, reason: err.to_string() };
                    return Err(err);
                }
            };

            layout.scatter(outcome.x_hat.view(), &mut full);
            let comps = functional.components(full.view(), &rf);
            if !comps.is_finite() {
                let err = AnnealError::NumericalDivergence {
                    rung: index,
                    beta,
                    detail: format!(
                        "action {} (measurement {}, model {})",
                        comps.action, comps.measurement_error, comps.model_error
                    ),
                };
                log::error!("rung {index} (beta = {beta}) diverged: {err}");
                self.state = AnnealState::Failed { rung: index, reason: err.to_string() };
                return Err(err);
            }

            let (path, params) = layout.unpack(full.view());
            let result = RungResult {
                index,
                beta,
                rf,
                path,
                params,
                action: comps.action,
                measurement_error: comps.measurement_error,
                model_error: comps.model_error,
                converged: outcome.converged,
                status: outcome.status,
                iterations: outcome.iterations,
            };
            log::info!(
                "rung {index}: beta = {beta}, RF scale = {:.3e}, action = {:.6e}, \
                 measurement = {:.6e}, model = {:.6e}, iterations = {}, converged = {}",
                self.options.alpha.powf(beta),
                result.action,
                result.measurement_error,
                result.model_error,
                result.iterations,
                result.converged
            );
            hook.on_rung_end(index, &result);

            let converged = result.converged;
            let status = result.status.clone();
            self.results.push(result);
            if !converged {
                log::warn!("rung {index} (beta = {beta}) did not converge: {status}");
                if self.options.on_non_convergence == NonConvergencePolicy::Abort {
                    let err = AnnealError::RungNotConverged { rung: index, beta, status };
                    self.state = AnnealState::Failed { rung: index, reason: err.to_string() };
                    return Err(err);
                }
            }
        }

        self.state = AnnealState::Converged;
        Ok(&self.results)
    }

    /// Copy observations into the measured slots of the data-aligned rows.
    fn overwrite_measured(&self, full: &mut Array1<f64>) {
        let (d, m) = (self.model.dim(), self.options.model_substeps);
        let y = self.observations.values();
        for n in 0..self.observations.n_times() {
            for (i, &l) in self.lidx.indices().iter().enumerate() {
                full[n * m * d + l] = y[[n, i]];
            }
        }
    }

    /// Compare the exact action gradient with central differences at
    /// `(path, params)` using rung `rung`'s model precision.
    ///
    /// # Errors
    /// - [`AnnealError::IndexOutOfRange`] if `rung` is past the ladder.
    /// - Shape errors for a malformed point.
    /// - `NumericalDivergence` if the action is not finite there.
    pub fn gradient_check(
        &self, rung: usize, path: ArrayView2<f64>, params: &ParameterSet,
    ) -> AnnealResult<GradientCheck> {
        let betas = self.options.ladder.betas();
        let beta = *betas.get(rung).ok_or(AnnealError::IndexOutOfRange {
            what: "rung",
            index: rung,
            len: betas.len(),
        })?;
        self.check_guess(path, params)?;
        let layout = VariableLayout::new(
            self.n_model_times(),
            self.model.dim(),
            params,
            &self.pidx,
            &self.options.bounds,
        )?;
        let full = layout.pack(path, params);
        let functional = ActionFunctional::new(
            self.model.model(),
            self.options.discretization,
            &layout,
            &self.observations,
            &self.lidx,
            self.rm.clone(),
            self.options.model_substeps,
            self.options.normalization,
            full,
        )?;
        let rf = model_precision(&self.rf0, self.options.alpha, beta);
        functional
            .gradient_check(&functional.free_vector(), &rf)
            .map_err(|e| AnnealError::from_rung(rung, beta, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annealing::{
        core::{bounds::BoundsSpec, ladder::BetaLadder},
        models::{simulate_rk4, LinearDecay},
    };
    use crate::optimization::minimizer::{MinimizerOptions, Tolerances};
    use ndarray::{array, Axis};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Cross-validation in `Annealer::new` and of the initial guess.
    // - `init_to_data` at m > 1 touching only data-aligned measured slots.
    // - Hook ordering, state transitions and the `Abort` policy.
    //
    // Full-ladder accuracy is covered by the integration tests.
    // -------------------------------------------------------------------------

    fn decay_observations(n: usize) -> Observations {
        let model = LinearDecay::new(2);
        let params = ParameterSet::Constant(array![0.5]);
        let path =
            simulate_rk4(&model, array![1.0, 2.0].view(), &params, 0.0, 0.1, n).expect("finite path");
        let measured = path.column(0).to_owned().insert_axis(Axis(1));
        Observations::new(0.0, 0.1, measured).expect("valid observations")
    }

    fn options(n_rungs: usize) -> AnnealOptions {
        AnnealOptions::new(1.0, 1.0, 2.0, BetaLadder::integers(n_rungs).expect("valid ladder"))
            .expect("valid options")
    }

    #[test]
    fn configuration_is_cross_checked() {
        let obs = decay_observations(5);
        assert!(matches!(
            Annealer::new(LinearDecay::new(2), obs.clone(), &[2], &[0], options(2)),
            Err(AnnealError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            Annealer::new(LinearDecay::new(2), obs.clone(), &[0, 1], &[0], options(2)),
            Err(AnnealError::ShapeMismatch { what: "observations", .. })
        ));
        let short_bounds = BoundsSpec::new(vec![(0.0, 1.0)], vec![]).expect("valid bounds");
        assert!(matches!(
            Annealer::new(LinearDecay::new(2), obs.clone(), &[0], &[0], options(2).with_bounds(short_bounds)),
            Err(AnnealError::ShapeMismatch { what: "state bounds", .. })
        ));
        let no_tolerances = MinimizerOptions {
            tols: Tolerances { tol_grad: None, tol_cost: None, max_iter: None },
            ..MinimizerOptions::default()
        };
        assert!(matches!(
            Annealer::new(LinearDecay::new(2), obs, &[0], &[0], options(2).with_minimizer(no_tolerances)),
            Err(AnnealError::InvalidMinimizerOptions { .. })
        ));
    }

    #[test]
    fn malformed_guess_is_rejected_before_any_rung() {
        let obs = decay_observations(5);
        let mut annealer =
            Annealer::new(LinearDecay::new(2), obs, &[0], &[0], options(2)).expect("valid setup");
        let err = annealer
            .anneal(Array2::zeros((4, 2)), ParameterSet::Constant(array![0.5]))
            .expect_err("wrong row count");
        assert!(err.is_configuration());
        assert!(annealer.results().is_empty());
    }

    #[test]
    // Purpose
    // -------
    // A ladder whose top rung overflows the model precision must be refused
    // at setup rather than after the lower rungs have run.
    //
    // Given
    // -----
    // - RF0 = 1, α = 2 and rungs β = (0, 2000), so 2^2000 is infinite.
    //
    // Expect
    // ------
    // - `InvalidLadder` at index 1, classified as a configuration error.
    fn overflowing_precision_schedule_is_rejected_at_setup() {
        // Arrange
        let ladder = BetaLadder::new(vec![0.0, 2000.0]).expect("increasing ladder");
        let opts = AnnealOptions::new(1.0, 1.0, 2.0, ladder).expect("valid options");

        // Act
        let err = Annealer::new(LinearDecay::new(2), decay_observations(5), &[0], &[0], opts)
            .map(|_| ())
            .expect_err("RF overflows at the top rung");

        // Assert
        assert!(matches!(err, AnnealError::InvalidLadder { index: 1, .. }));
        assert!(err.is_configuration());
    }

    /// `dx/dt = −k·√x`, undefined for negative states.
    struct SqrtDecay;

    impl Dynamics for SqrtDecay {
        fn dim(&self) -> usize {
            1
        }

        fn n_params(&self) -> usize {
            1
        }

        fn rhs<S: crate::autodiff::Scalar>(&self, _t: f64, x: &[S], p: &[S], out: &mut [S]) {
            out[0] = -(p[0] * x[0].sqrt());
        }
    }

    struct Recorder {
        starts: Vec<(usize, Array2<f64>)>,
        ends: Vec<usize>,
    }

    impl RungHook for Recorder {
        fn on_rung_start(&mut self, index: usize, _beta: f64, path: ArrayView2<f64>, _: &ParameterSet) {
            self.starts.push((index, path.to_owned()));
        }

        fn on_rung_end(&mut self, index: usize, _result: &RungResult) {
            self.ends.push(index);
        }
    }

    #[test]
    // Purpose
    // -------
    // With m = 2, `init_to_data` must overwrite only the measured component
    // on the data-aligned rows of the rung-0 guess.
    //
    // Given
    // -----
    // - 3 observations of component 0, D = 2, zero initial path.
    //
    // Expect
    // ------
    // - Rows 0, 2, 4 of column 0 hold the data; rows 1, 3 and column 1 stay 0.
    fn init_to_data_touches_only_aligned_measured_slots() {
        // Arrange
        let obs = decay_observations(3);
        let y = obs.values().to_owned();
        let opts = options(1).with_init_to_data(true).with_model_substeps(2).expect("m = 2");
        let mut annealer = Annealer::new(LinearDecay::new(2), obs, &[0], &[0], opts).expect("valid setup");
        let mut hook = Recorder { starts: Vec::new(), ends: Vec::new() };

        // Act
        annealer
            .anneal_with_hook(Array2::zeros((5, 2)), ParameterSet::Constant(array![0.5]), &mut hook)
            .expect("run completes");

        // Assert
        let start = &hook.starts[0].1;
        for n in 0..3 {
            assert_eq!(start[[2 * n, 0]], y[[n, 0]]);
        }
        assert_eq!(start[[1, 0]], 0.0);
        assert_eq!(start[[3, 0]], 0.0);
        assert!(start.column(1).iter().all(|&v| v == 0.0));
        assert_eq!(hook.ends, vec![0]);
        assert_eq!(annealer.state(), &AnnealState::Converged);
    }

    #[test]
    // Purpose
    // -------
    // Under `Abort`, the first non-converged rung is recorded and the ladder
    // stops with `RungNotConverged`.
    //
    // Given
    // -----
    // - A one-iteration budget with a tolerance no run can meet in one step.
    //
    // Expect
    // ------
    // - Exactly one rung recorded, flagged non-converged; state `Failed`.
    fn abort_policy_stops_after_first_non_converged_rung() {
        // Arrange
        let obs = decay_observations(6);
        let tight = MinimizerOptions {
            tols: Tolerances::new(Some(1e-300), None, Some(1)).expect("valid tolerances"),
            ..MinimizerOptions::default()
        };
        let opts = options(3)
            .with_minimizer(tight)
            .with_non_convergence_policy(NonConvergencePolicy::Abort);
        let mut annealer = Annealer::new(LinearDecay::new(2), obs, &[0], &[0], opts).expect("valid setup");

        // Act
        let err = annealer
            .anneal(Array2::from_elem((6, 2), 3.0), ParameterSet::Constant(array![1.5]))
            .expect_err("budget too small");

        // Assert
        assert!(matches!(err, AnnealError::RungNotConverged { rung: 0, .. }));
        assert_eq!(annealer.results().len(), 1);
        assert_eq!(annealer.results().non_converged_rungs(), vec![0]);
        assert!(matches!(annealer.state(), AnnealState::Failed { rung: 0, .. }));
    }

    #[test]
    // Purpose
    // -------
    // A model that turns non-finite must stop the ladder with
    // `NumericalDivergence` and leave nothing behind to seed a later rung.
    //
    // Given
    // -----
    // - `dx/dt = −k·√x` with an all-negative initial path and no bounds.
    // - A three-rung ladder observed through a recording hook.
    //
    // Expect
    // ------
    // - `NumericalDivergence` at rung 0 and state `Failed { rung: 0 }`.
    // - No rung recorded and no rung-end notification; only rung 0 started.
    fn non_finite_model_stops_the_ladder() {
        // Arrange
        let obs = Observations::new(0.0, 0.1, Array2::from_elem((6, 1), 1.0)).expect("valid observations");
        let mut annealer = Annealer::new(SqrtDecay, obs, &[0], &[0], options(3)).expect("valid setup");
        let mut hook = Recorder { starts: Vec::new(), ends: Vec::new() };

        // Act
        let err = annealer
            .anneal_with_hook(Array2::from_elem((6, 1), -1.0), ParameterSet::Constant(array![0.5]), &mut hook)
            .map(|_| ())
            .expect_err("square root of a negative state");

        // Assert
        assert!(matches!(err, AnnealError::NumericalDivergence { rung: 0, .. }));
        assert!(matches!(annealer.state(), AnnealState::Failed { rung: 0, .. }));
        assert!(annealer.results().is_empty());
        assert_eq!(hook.starts.len(), 1);
        assert!(hook.ends.is_empty());
    }

    #[test]
    fn gradient_check_validates_rung_index() {
        let obs = decay_observations(4);
        let annealer = Annealer::new(LinearDecay::new(2), obs, &[0], &[0], options(2)).expect("valid setup");
        let path = Array2::from_elem((4, 2), 0.7);
        let params = ParameterSet::Constant(array![0.3]);
        assert!(matches!(
            annealer.gradient_check(5, path.view(), &params),
            Err(AnnealError::IndexOutOfRange { what: "rung", .. })
        ));
        let check = annealer.gradient_check(1, path.view(), &params).expect("finite action");
        assert!(check.max_rel_err < 1e-5);
    }
}
