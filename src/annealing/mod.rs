//! annealing — variational annealing for joint state and parameter estimation.
//!
//! Purpose
//! -------
//! Estimate the full state path and the unknown parameters of a
//! continuous-time model from partial, noisy observations by minimizing a
//! weak-constraint action over a ladder of increasing model precisions.
//!
//! Key behaviors
//! -------------
//! - [`core`]: validated inputs and configuration (observations, index sets,
//!   parameter sets, bounds, beta ladder, options, variable layout, random
//!   initial guesses).
//! - [`models`]: the [`Dynamics`](models::Dynamics) interface, batch
//!   evaluation, RK4 simulation and reference models.
//! - [`action`]: discretization residuals and the action functional with its
//!   exact gradient.
//! - [`annealer`]: the ladder controller with warm starts, hooks and
//!   non-convergence policy.
//! - [`results`]: per-rung results, history views and persistence.
//!
//! Invariants & assumptions
//! ------------------------
//! - `RF = RF0 ∘ α^β` strictly increases along the ladder (`α > 1`, strictly
//!   increasing `β`).
//! - Rungs run strictly in sequence; each starts from the previous optimum.
//! - Configuration errors surface before the first rung; non-finite actions
//!   stop the run.
//!
//! Downstream usage
//! ----------------
//! - Build [`Observations`](core::Observations) and
//!   [`AnnealOptions`](core::AnnealOptions), construct an
//!   [`Annealer`](annealer::Annealer) for a model, call `anneal`, and read or
//!   persist the [`ResultStore`](results::ResultStore).
//! - `use var_anneal::annealing::prelude::*;` imports the common surface.
//!
//! Testing notes
//! -------------
//! - Unit tests live beside each submodule; `tests/` runs full ladders on
//!   the linear-decay and Lorenz-96 systems.

pub mod action;
pub mod annealer;
pub mod core;
pub mod errors;
pub mod models;
pub mod results;

pub mod prelude {
    pub use super::action::{ActionComponents, ActionFunctional, Discretization};
    pub use super::annealer::{AnnealState, Annealer, RungHook};
    pub use super::core::prelude::*;
    pub use super::errors::{AnnealError, AnnealResult};
    pub use super::models::{Dynamics, LinearDecay, Lorenz96, ModelAdapter, simulate_rk4};
    pub use super::results::{
        ResultStore, RungResult, load_action_errors, load_params, load_paths,
    };
}
