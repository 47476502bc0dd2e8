//! core — observations, index sets, parameters, bounds, schedule and layout.
//!
//! Purpose
//! -------
//! Collect the validated building blocks an annealing run is assembled from:
//! the observation table, the measured/estimated index sets, the parameter
//! set variant, per-slot bounds, the beta ladder and precision schedule, the
//! run options, the free-variable layout and random initial guesses.
//!
//! Key behaviors
//! -------------
//! - [`Observations`] ingest a `[N, 1 + L]` table (time column first) and
//!   enforce uniform spacing.
//! - [`MeasurementMap`] and [`ParamIndex`] hold `Lidx` and `Pidx` as
//!   distinct, in-range index sets.
//! - [`ParameterSet`] is `Constant | TimeVarying`; nothing downstream relies
//!   on implicit broadcasting.
//! - [`BoundsSpec`], [`BetaLadder`] and [`AnnealOptions`] reject invalid
//!   values at construction; [`model_precision`] computes `RF0 ∘ α^β`.
//! - [`VariableLayout`] maps `(path, parameters)` to the minimizer's free
//!   vector and back.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every value type here is validated on its own; cross-checks between
//!   them (dimensions, row counts, index ranges) happen when the annealer is
//!   built.
//! - Indexing is 0-based; paths are `[N, D]` row-per-time.
//!
//! Conventions
//! -----------
//! - No logging or I/O in this module.
//!
//! Testing notes
//! -------------
//! - Unit tests in each submodule cover validation failures and the
//!   layout's slot arithmetic; full runs are exercised by the integration
//!   tests.

pub mod bounds;
pub mod data;
pub mod indices;
pub mod init;
pub mod ladder;
pub mod layout;
pub mod options;
pub mod params;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::bounds::BoundsSpec;
pub use self::data::Observations;
pub use self::indices::{MeasurementMap, ParamIndex};
pub use self::init::{random_params, random_path};
pub use self::ladder::{BetaLadder, model_precision};
pub use self::layout::VariableLayout;
pub use self::options::{AnnealOptions, NonConvergencePolicy, Normalization, Precision};
pub use self::params::ParameterSet;

pub mod prelude {
    pub use super::bounds::BoundsSpec;
    pub use super::data::Observations;
    pub use super::init::{random_params, random_path};
    pub use super::ladder::BetaLadder;
    pub use super::options::{AnnealOptions, NonConvergencePolicy, Normalization, Precision};
    pub use super::params::ParameterSet;
}
