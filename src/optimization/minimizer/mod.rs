//! minimizer — argmin-powered, box-constrained L-BFGS.
//!
//! Purpose
//! -------
//! Provide a high-level, Argmin-backed optimization layer for **minimizing**
//! a smooth objective `f(x)` subject to per-variable box bounds. Callers
//! implement a single trait, [`Objective`], and invoke [`minimize`] to run
//! L-BFGS with a configurable line search, tolerances, bound strategy, and
//! finite-difference fallbacks.
//!
//! Key behaviors
//! -------------
//! - Bridge user objectives into Argmin via [`adapter::ArgMinAdapter`],
//!   composing them with a [`bounds::BoxMap`] that keeps every evaluation
//!   inside the box.
//! - Expose a single, user-facing entrypoint [`minimize`] that:
//!   - validates the initial guess and bounds,
//!   - selects an L-BFGS solver via [`builders`] based on [`LineSearcher`],
//!   - executes the solver via [`run::run_lbfgs`], and
//!   - normalizes results into a [`MinimizeOutcome`].
//! - Track the best iterate with [`observer::BestPointTracker`] so a backend
//!   failure still yields a usable, non-converged outcome.
//! - Provide finite-difference helpers in [`finite_diff`] for gradients
//!   when exact derivatives are missing, and a [`gradient_check`].
//!
//! Invariants & assumptions
//! ------------------------
//! - [`Objective::value`] and [`Objective::grad`] must treat invalid inputs
//!   as recoverable [`OptError`] values, not panics.
//! - A non-finite cost or gradient is never silently absorbed: it surfaces
//!   as an error from [`minimize`].
//! - `MinimizeOutcome::x_hat` always satisfies the configured bounds.
//!
//! Conventions
//! -----------
//! - Variables live in the caller's coordinates as [`Theta`]
//!   (`Array1<f64>`); the solver may iterate over transformed coordinates,
//!   which never leak out of this module.
//! - Errors bubble up as [`OptResult<T>`] / [`OptError`]; this module and its
//!   children never intentionally panic or use `unsafe`.
//!
//! Downstream usage
//! ----------------
//! - The annealing engine implements [`Objective`] for its action functional
//!   and calls [`minimize`] once per rung with the warm-start point, the
//!   free-variable bounds, and the configured [`MinimizerOptions`].
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover gradient chaining through the box map,
//!   solver construction, validation, outcome invariants, and bounded
//!   solves on quadratic toy objectives.
//!
//! [`OptError`]: crate::optimization::errors::OptError
//! [`OptResult<T>`]: crate::optimization::errors::OptResult

pub mod adapter;
pub mod api;
pub mod bounds;
pub mod builders;
pub mod finite_diff;
pub mod observer;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::minimize;
pub use self::finite_diff::{GradientCheck, gradient_check};
pub use self::traits::{
    BoundStrategy, LineSearcher, MinimizeOutcome, MinimizerOptions, Objective, Tolerances,
};
pub use self::types::{Bound, Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use var_anneal::optimization::minimizer::prelude::*;
//
// to import the main minimizer surface in a single line.

pub mod prelude {
    pub use super::api::minimize;
    pub use super::traits::{
        BoundStrategy, LineSearcher, MinimizeOutcome, MinimizerOptions, Objective, Tolerances,
    };
    pub use super::types::{Bound, Cost, Grad, Theta};
}
