//! Public API surface for bounded minimization.
//!
//! - [`Objective`]: trait users implement for the function being minimized.
//! - [`MinimizerOptions`] and [`Tolerances`]: configuration for the optimizer.
//! - [`LineSearcher`]: choice of line search used by L-BFGS.
//! - [`BoundStrategy`]: how box constraints are enforced around L-BFGS.
//! - [`MinimizeOutcome`]: normalized result returned by [`minimize`](super::minimize).
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{
        types::{Cost, FnEvalMap, Grad, Theta},
        validation::{validate_estimate, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::str::FromStr;
use std::time::Duration;

/// User-implemented objective interface.
///
/// - `type Data`: per-run payload carried into `value`/`grad`/`check`.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate the cost.
/// - `check(&Theta, &Data) -> OptResult<()>`: reject obviously invalid
///   inputs. Called once before optimization.
///
/// Optional:
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: exact gradient of the cost.
///   If not implemented, finite differences are used automatically.
pub trait Objective {
    type Data: 'static;

    // Required methods
    fn value(&self, x: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, x: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn grad(&self, _x: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Choice of line search used inside the L-BFGS solver.
///
/// Parsing is case-insensitive (`"MoreThuente"`, `"HagerZhang"`). Unknown
/// names return `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// How box bounds are enforced around the unconstrained L-BFGS solver.
///
/// - `Transform` (default): optimize `u` with `x = T(u)` per coordinate
///   (logistic for intervals, softplus for one-sided bounds); iterates can
///   never leave the box.
/// - `Clamp`: evaluate at `clamp(x)` and zero gradient components that push
///   outward from an active bound (projected gradient).
///
/// Parsing is case-insensitive (`"Transform"`, `"Clamp"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundStrategy {
    #[default]
    Transform,
    Clamp,
}

impl FromStr for BoundStrategy {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "transform" => Ok(BoundStrategy::Transform),
            "clamp" => Ok(BoundStrategy::Clamp),
            _ => Err(OptError::InvalidBoundStrategy {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'Transform' or 'Clamp'.",
            }),
        }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols: Tolerances` — numerical tolerances and iteration limits.
/// - `line_searcher: LineSearcher` — line-search algorithm used by L-BFGS.
/// - `bound_strategy: BoundStrategy` — how boxes are enforced.
/// - `verbose: bool` — if `true`, attaches an observer (behind the `obs_slog`
///   feature) and prints progress.
/// - `lbfgs_mem: Option<usize>` — history size; `None` uses
///   [`DEFAULT_LBFGS_MEM`](super::types::DEFAULT_LBFGS_MEM).
/// - `timeout: Option<Duration>` — wall-clock cap for a single run.
///
/// Default:
/// - `tols`: `tol_grad = 1e-6`, `tol_cost = None`, `max_iter = 300`
/// - `line_searcher`: `MoreThuente`
/// - `bound_strategy`: `Transform`
/// - `verbose`: `false`, `lbfgs_mem`: `None`, `timeout`: `None`
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizerOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub bound_strategy: BoundStrategy,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
    pub timeout: Option<Duration>,
}

impl MinimizerOptions {
    /// Create a new set of optimizer options.
    ///
    /// Numeric tolerances are validated inside [`Tolerances::new`]; this
    /// constructor only checks the L-BFGS memory.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self {
            tols,
            line_searcher,
            bound_strategy: BoundStrategy::default(),
            verbose: false,
            lbfgs_mem,
            timeout: None,
        })
    }

    pub fn with_bound_strategy(mut self, strategy: BoundStrategy) -> Self {
        self.bound_strategy = strategy;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Cap each run's wall-clock time.
    ///
    /// # Errors
    /// [`OptError::InvalidTimeout`] for a zero duration.
    pub fn with_timeout(mut self, timeout: Duration) -> OptResult<Self> {
        if timeout.is_zero() {
            return Err(OptError::InvalidTimeout);
        }
        self.timeout = Some(timeout);
        Ok(self)
    }
}

impl Default for MinimizerOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: None, max_iter: Some(300) },
            line_searcher: LineSearcher::MoreThuente,
            bound_strategy: BoundStrategy::default(),
            verbose: false,
            lbfgs_mem: None,
            timeout: None,
        }
    }
}

/// Numerical tolerances and iteration limits used by the optimizer.
///
/// - `tol_grad`: terminate when the gradient norm falls below this threshold.
/// - `tol_cost`: terminate when the change in cost falls below this threshold.
/// - `max_iter`: hard cap on the number of iterations.
///
/// Any field can be `None` but **at least one** of the three must be provided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Canonical result returned by `minimize`.
///
/// - `x_hat`: best point found, in the caller's (bounded) coordinates.
/// - `value`: cost at `x_hat`.
/// - `converged`: `true` only when the solver met a tolerance
///   (`SolverConverged`) or a target cost; budget exhaustion, timeouts and
///   backend failures report `false`.
/// - `status`: human-readable termination status string.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
/// - `grad_norm`: norm of the last available solver gradient, if present.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizeOutcome {
    pub x_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl MinimizeOutcome {
    /// Build a validated [`MinimizeOutcome`] from raw solver state.
    ///
    /// # Errors
    /// - Propagates any validation errors for `x_hat` or `value`.
    pub fn new(
        x_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let x_hat = validate_estimate(x_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(reason) => {
                let converged = matches!(
                    reason,
                    TerminationReason::SolverConverged | TerminationReason::TargetCostReached
                );
                (converged, format!("{reason:?}"))
            }
        };
        let iterations = iterations as usize;
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self { x_hat, value, converged, status, iterations, fn_evals, grad_norm })
    }

    /// Outcome for a run the backend aborted; reports the best point seen.
    pub fn interrupted(
        x_hat: Theta, value: f64, iterations: u64, status: String,
    ) -> OptResult<Self> {
        let x_hat = validate_estimate(Some(x_hat))?;
        validate_value(value)?;
        Ok(Self {
            x_hat,
            value,
            converged: false,
            status,
            iterations: iterations as usize,
            fn_evals: FnEvalMap::new(),
            grad_norm: None,
        })
    }
}
