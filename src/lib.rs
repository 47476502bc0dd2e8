//! var_anneal — variational annealing for partially observed dynamical systems.
//!
//! Purpose
//! -------
//! Serve as the crate root. Given a model `dx/dt = f(t, x, p)`, a uniformly
//! sampled record of some state components, and a beta ladder, the crate
//! recovers the full state path and the unknown parameters by minimizing a
//! weak-constraint action at increasing model precision.
//!
//! Key behaviors
//! -------------
//! - [`annealing`]: the estimation engine (inputs, models, action, ladder
//!   controller, results).
//! - [`optimization`]: the bounded L-BFGS minimizer the engine calls at each
//!   rung, built on `argmin`.
//! - [`autodiff`]: forward-mode dual numbers that give the action its exact
//!   gradient.
//!
//! Conventions
//! -----------
//! - Arrays are `ndarray` containers; paths are `[N, D]` with one row per time.
//! - Fallible entry points return `AnnealResult<T>` or `OptResult<T>`.
//! - Logging goes through the `log` facade; per-iteration optimizer traces
//!   need the `obs_slog` feature.
//!
//! Downstream usage
//! ----------------
//! - `use var_anneal::prelude::*;` brings in the engine surface.

pub mod annealing;
pub mod autodiff;
pub mod optimization;

pub mod prelude {
    pub use crate::annealing::prelude::*;
    pub use crate::autodiff::{Dual, Scalar};
    pub use crate::optimization::minimizer::{
        BoundStrategy, GradientCheck, LineSearcher, MinimizerOptions, Tolerances,
    };
    pub use crate::optimization::errors::{OptError, OptResult};
}
