//! Validation helpers for bounded minimization.
//!
//! This module centralizes common consistency checks used across the
//! minimizer interface:
//!
//! - **Tolerance checks**: [`verify_tol_grad`], [`verify_tol_cost`] ensure
//!   numeric tolerances are finite and strictly positive when provided.
//! - **Gradient validation**: [`validate_grad`] enforces correct dimension
//!   and finite entries.
//! - **Inputs**: [`validate_bounds`] and [`validate_initial_guess`] reject
//!   malformed boxes and non-finite starting points before a run.
//! - **Estimates**: [`validate_estimate`] ensures a candidate exists and
//!   contains only finite values; [`validate_value`] checks objective
//!   outputs for finiteness.
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::types::{Bound, Grad, Theta},
};

/// Validate the optional gradient‐norm tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate the optional cost‐change tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if length does not match `dim`.
/// - [`OptError::InvalidGradient`] with the index/value of the first
///   offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate a box per free variable.
///
/// Each `(low, high)` must satisfy `low ≤ high` with no NaN; infinite ends
/// are allowed.
///
/// # Errors
/// - [`OptError::BoundsDimMismatch`] if `bounds.len() != dim`.
/// - [`OptError::InvalidBound`] for the first malformed slot.
pub fn validate_bounds(bounds: &[Bound], dim: usize) -> OptResult<()> {
    if bounds.len() != dim {
        return Err(OptError::BoundsDimMismatch { expected: dim, found: bounds.len() });
    }
    for (index, &(low, high)) in bounds.iter().enumerate() {
        if low.is_nan() || high.is_nan() || low > high {
            return Err(OptError::InvalidBound { index, low, high });
        }
    }
    Ok(())
}

/// Reject starting points with NaN/∞ entries.
pub fn validate_initial_guess(x0: &Theta) -> OptResult<()> {
    match x0.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(OptError::InvalidInitialGuess { index, value: x0[index] }),
        None => Ok(()),
    }
}

/// Validate and unwrap an estimated variable vector.
///
/// # Errors
/// - [`OptError::MissingEstimate`] if no vector was provided.
/// - [`OptError::InvalidEstimate`] if any element is non-finite.
pub fn validate_estimate(estimate: Option<Theta>) -> OptResult<Theta> {
    match estimate {
        Some(t) => {
            for (index, &value) in t.iter().enumerate() {
                if !value.is_finite() {
                    return Err(OptError::InvalidEstimate {
                        index,
                        value,
                        reason: "Estimates must be finite.",
                    });
                }
            }
            Ok(t)
        }
        None => Err(OptError::MissingEstimate),
    }
}

/// Validate that a scalar objective value is finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}
