//! optimization — bounded minimizer, numerical helpers, and unified error surface.
//!
//! Purpose
//! -------
//! Provide the step optimizer the annealing engine treats as a black box: an
//! Argmin-backed, box-constrained L-BFGS minimizer, numerically stable
//! coordinate transforms for enforcing bounds, and a single error/result
//! surface. Callers implement an objective, choose tolerances, and obtain the
//! minimizer and diagnostics without touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - Expose a high-level API for **minimizing** `f(x)` under box bounds
//!   (`minimizer`), including solver, line-search, bound-strategy and
//!   stopping-criteria configuration.
//! - Supply shared numerical primitives (`numerical_stability`) for mapping
//!   unconstrained solver coordinates into bounded variables.
//! - Normalize configuration issues, numerical failures, and backend solver
//!   errors into a single enum (`errors::OptError`) with a common result
//!   alias (`OptResult<T>`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite once validation has passed; invalid states are
//!   reported as `OptError`, not panics.
//! - Objectives report domain violations as recoverable errors surfaced
//!   through the optimization layer.
//!
//! Conventions
//! -----------
//! - Variables and gradients are `ndarray`-based aliases (`Theta`, `Grad`).
//! - Public entrypoints that can fail return `OptResult<T>`; callers never
//!   see raw Argmin errors.
//! - Only the runner logs (a `warn!` when a run ends early); per-iteration
//!   tracing is available behind the `obs_slog` feature.
//!
//! Downstream usage
//! ----------------
//! - Front-ends import the curated surface via `optimization::prelude::*`.
//!
//! Testing notes
//! -------------
//! - Unit tests in the submodules focus on local concerns:
//!   - `minimizer`: solver wiring, bound handling, tolerance validation, and
//!     bounded solves on toy objectives.
//!   - `numerical_stability`: agreement with naïve formulas on safe grids,
//!     tails, and transform round trips.
//!   - `errors`: conversions from backend errors into `OptError`.

pub mod errors;
pub mod minimizer;
pub mod numerical_stability;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::minimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
