//! autodiff — exact derivatives for action evaluation.
//!
//! Purpose
//! -------
//! Supply the derivative capability the annealing engine relies on: given a
//! pure numeric block function written once against the [`Scalar`] trait,
//! return its value and its exact Jacobian with respect to a chosen set of
//! inputs. Model right-hand sides and discretization residuals are written
//! generically over [`Scalar`], so the same code path serves plain `f64`
//! evaluation and forward-mode differentiation.
//!
//! Key behaviors
//! -------------
//! - [`Scalar`] abstracts over `f64` and [`Dual`], exposing the arithmetic and
//!   elementary functions a dynamics model is allowed to use.
//! - [`Dual`] carries a primal value and one tangent; seeding one input at a
//!   time yields one exact Jacobian column per sweep.
//! - [`ForwardSweep`] owns reusable buffers and assembles the full local
//!   Jacobian of a block function (`n_in` inputs → `n_out` outputs).
//!
//! Invariants & assumptions
//! ------------------------
//! - Block functions must be pure: the same inputs always produce the same
//!   outputs, with no branching on the *values* of differentiated inputs.
//! - Derivatives are exact up to floating-point rounding; there is no step
//!   size and no truncation error.
//!
//! Conventions
//! -----------
//! - Jacobians are stored row-major as `Array2<f64>` with shape
//!   `(n_out, n_in)`.
//! - The engine differentiates small per-interval blocks (two neighboring
//!   path points plus their parameters), so forward mode costs
//!   `O(n_in)` block evaluations per interval and never materializes a
//!   global tape.
//!
//! Testing notes
//! -------------
//! - Unit tests compare dual-number derivatives against closed forms and
//!   check sweep Jacobians on small polynomial and trigonometric blocks.

pub mod dual;
pub mod scalar;
pub mod sweep;

pub use self::dual::Dual;
pub use self::scalar::Scalar;
pub use self::sweep::ForwardSweep;
