//! models — dynamics interface, batch adapter, simulation and reference models.
//!
//! Purpose
//! -------
//! Define how a caller hands a continuous-time model to the engine
//! ([`Dynamics`]), evaluate it over batches of path points
//! ([`ModelAdapter`]), integrate it forward for twin experiments
//! ([`simulate_rk4`]), and ship two reference systems ([`Lorenz96`],
//! [`LinearDecay`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Models are pure; the same `(t, x, p)` always yields the same derivative.
//! - Right-hand sides are generic over `Scalar` and never branch on the
//!   values of `x` or `p`.

pub mod dynamics;
pub mod library;

pub use self::dynamics::{Dynamics, ModelAdapter, simulate_rk4};
pub use self::library::{LinearDecay, Lorenz96};
