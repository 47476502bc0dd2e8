//! Numerical stability utilities.
//!
//! Provides safe implementations of the nonlinear transforms used to map an
//! unconstrained optimizer variable `u ∈ ℝ` into a box `[low, high]`.
//! Guarded strategies use explicit cutoffs (`x > 20.0`) to keep `f64`
//! arithmetic in a well-conditioned regime.
//!
//! # Provided items
//! - [`BOUND_EPS`]: relative inward nudge applied when an initial value sits
//!   exactly on a bound (the logistic/softplus inverses diverge there).
//! - [`safe_softplus(x)`]: stable version of `ln(1 + exp(x))`,
//!   mapping ℝ → (0, ∞) without overflow.
//! - [`safe_softplus_inv(x)`]: inverse of softplus, mapping
//!   (0, ∞) → ℝ without catastrophic cancellation.
//! - [`safe_logistic(x)`]: stable `1 / (1 + exp(-x))`, also the derivative of
//!   softplus.
//! - [`logit(t)`]: inverse of the logistic on `(0, 1)`.
//! - [`BoxTransform`]: per-coordinate map chosen from the finiteness of a
//!   slot's bounds, with forward, inverse and derivative.

/// Relative distance used to pull boundary values inside the open box.
pub const BOUND_EPS: f64 = 1e-9;

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// - For sufficiently large `x`, `softplus(x) ≈ x + ln1p(exp(-x)) ≈ x`.
/// - Otherwise, it falls back to `ln1p(exp(x))`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Stable inverse of softplus on `(0, ∞)`: solves for `t` in
/// `softplus(t) = x`, returning `t = ln(exp(x) - 1)`.
///
/// - For sufficiently large `x`, `ln(exp(x) - 1) ≈ x`.
/// - Otherwise, it uses `ln(expm1(x))`.
pub fn safe_softplus_inv(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp_m1().ln() }
}

/// Numerically stable logistic `σ(x) = 1 / (1 + exp(-x))`.
///
/// Evaluates `exp` only on non-positive arguments so neither branch
/// overflows.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

/// Inverse logistic on `(0, 1)`.
pub fn logit(t: f64) -> f64 {
    (t / (1.0 - t)).ln()
}

/// Coordinate-wise map from unconstrained `u` to a bounded `x`.
///
/// - `Identity`: `x = u` (no finite bound).
/// - `Interval`: `x = low + (high − low)·σ(u)`.
/// - `Lower`: `x = low + softplus(u)`.
/// - `Upper`: `x = high − softplus(u)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoxTransform {
    Identity,
    Interval { low: f64, high: f64 },
    Lower { low: f64 },
    Upper { high: f64 },
}

impl BoxTransform {
    /// Select the transform matching which of `low`/`high` are finite.
    ///
    /// Degenerate intervals (`low == high`) map to `Identity`; callers are
    /// expected to remove pinned slots from the free vector beforehand.
    pub fn from_bounds(low: f64, high: f64) -> Self {
        match (low.is_finite(), high.is_finite()) {
            (false, false) => BoxTransform::Identity,
            (true, false) => BoxTransform::Lower { low },
            (false, true) => BoxTransform::Upper { high },
            (true, true) if high > low => BoxTransform::Interval { low, high },
            (true, true) => BoxTransform::Identity,
        }
    }

    pub fn forward(self, u: f64) -> f64 {
        match self {
            BoxTransform::Identity => u,
            BoxTransform::Interval { low, high } => {
                let x = low + (high - low) * safe_logistic(u);
                x.clamp(low, high)
            }
            BoxTransform::Lower { low } => low + safe_softplus(u),
            BoxTransform::Upper { high } => high - safe_softplus(u),
        }
    }

    /// Map a bounded value back to `u`, nudging boundary values inward.
    pub fn inverse(self, x: f64) -> f64 {
        match self {
            BoxTransform::Identity => x,
            BoxTransform::Interval { low, high } => {
                let t = ((x - low) / (high - low)).clamp(BOUND_EPS, 1.0 - BOUND_EPS);
                logit(t)
            }
            BoxTransform::Lower { low } => {
                let gap = (x - low).max(BOUND_EPS * low.abs().max(1.0));
                safe_softplus_inv(gap)
            }
            BoxTransform::Upper { high } => {
                let gap = (high - x).max(BOUND_EPS * high.abs().max(1.0));
                safe_softplus_inv(gap)
            }
        }
    }

    /// `dx/du` evaluated at `u`.
    pub fn deriv(self, u: f64) -> f64 {
        match self {
            BoxTransform::Identity => 1.0,
            BoxTransform::Interval { low, high } => {
                let s = safe_logistic(u);
                (high - low) * s * (1.0 - s)
            }
            BoxTransform::Lower { .. } => safe_logistic(u),
            BoxTransform::Upper { .. } => -safe_logistic(u),
        }
    }
}
