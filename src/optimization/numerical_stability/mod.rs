//! numerical_stability — guarded transforms for box-constrained optimization.
//!
//! Purpose
//! -------
//! Collect numerically stable scalar transforms used to map unconstrained
//! optimizer coordinates into bounded model coordinates. The minimizer's
//! `Transform` bound strategy is built entirely from these helpers.
//!
//! Key behaviors
//! -------------
//! - Provide stable scalar transforms (`safe_softplus`, its inverse,
//!   `safe_logistic`, `logit`) that never overflow for finite inputs.
//! - Provide [`BoxTransform`], the per-coordinate map for intervals,
//!   one-sided bounds, and free coordinates, with its inverse and derivative.
//!
//! Invariants & assumptions
//! ------------------------
//! - All public transforms assume finite `f64` inputs; bound validation
//!   (`low ≤ high`, no NaN) happens in the minimizer layer.
//! - `BoxTransform::forward` always lands inside `[low, high]`; inverses pull
//!   boundary values inward by [`BOUND_EPS`] so they stay finite.
//!
//! Conventions
//! -----------
//! - This module never logs or performs I/O; it is pure numerical helpers
//!   suitable for tight inner loops.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] cover agreement with naïve formulas on
//!   safe grids, tail behavior, round trips, and derivative checks against
//!   central differences.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    BOUND_EPS, BoxTransform, logit, safe_logistic, safe_softplus, safe_softplus_inv,
};

pub mod prelude {
    pub use super::transformations::{BoxTransform, safe_logistic, safe_softplus};
}
