//! action — discretization residuals and the action functional.
//!
//! Purpose
//! -------
//! Turn a continuous-time model into per-interval residual constraints
//! ([`Discretization`]) and combine them with the measurement mismatch into
//! the scalar objective minimized at each rung ([`ActionFunctional`]).
//!
//! Key behaviors
//! -------------
//! - Four residual schemes share one form, `x₁ − x₀ − dt·Φ`; SimpsonHermite
//!   is the default.
//! - The functional exposes its value, its recorded components and its
//!   exact gradient, and implements the minimizer's `Objective` trait over
//!   the free-variable vector.
//!
//! Testing notes
//! -------------
//! - Residual accuracy is checked on closed-form and RK4 trajectories; the
//!   exact gradient is checked against central differences for every scheme.

pub mod discretize;
pub mod functional;

pub use self::discretize::{Discretization, Stencil};
pub use self::functional::{ActionComponents, ActionFunctional};
