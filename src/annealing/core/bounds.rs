//! Box bounds for path and parameter slots.
//!
//! Bounds are given per state component (applied at every time) and per
//! estimated parameter, in `Pidx` order (applied at every time for a
//! time-varying set). A missing side means that family is unbounded.
use crate::annealing::errors::{AnnealError, AnnealResult};
use crate::optimization::minimizer::Bound;

const UNBOUNDED: Bound = (f64::NEG_INFINITY, f64::INFINITY);

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundsSpec {
    state: Option<Vec<Bound>>,
    params: Option<Vec<Bound>>,
}

fn validate(what: &'static str, bounds: &[Bound]) -> AnnealResult<()> {
    for (index, &(low, high)) in bounds.iter().enumerate() {
        // (∞, ∞) and (−∞, −∞) would pin a slot at infinity.
        let no_finite_value = low == f64::INFINITY || high == f64::NEG_INFINITY;
        if low.is_nan() || high.is_nan() || low > high || no_finite_value {
            return Err(AnnealError::InvalidBounds { what, index, low, high });
        }
    }
    Ok(())
}

impl BoundsSpec {
    /// No bounds on any slot.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Per-component state bounds (`D` entries) and per-estimated-parameter
    /// bounds (`|Pidx|` entries).
    ///
    /// # Errors
    /// [`AnnealError::InvalidBounds`] for `low > high`, NaN, or a box that
    /// holds no finite value (`low = +∞` or `high = −∞`).
    pub fn new(state: Vec<Bound>, params: Vec<Bound>) -> AnnealResult<Self> {
        validate("state", &state)?;
        validate("parameter", &params)?;
        Ok(Self { state: Some(state), params: Some(params) })
    }

    /// Split a concatenated list: the first `dim` entries bound the state
    /// components, the rest bound the estimated parameters.
    pub fn from_concatenated(bounds: &[Bound], dim: usize) -> AnnealResult<Self> {
        if bounds.len() < dim {
            return Err(AnnealError::ShapeMismatch {
                what: "bounds",
                expected: vec![dim],
                found: vec![bounds.len()],
            });
        }
        Self::new(bounds[..dim].to_vec(), bounds[dim..].to_vec())
    }

    pub fn with_state(mut self, state: Vec<Bound>) -> AnnealResult<Self> {
        validate("state", &state)?;
        self.state = Some(state);
        Ok(self)
    }

    pub fn with_params(mut self, params: Vec<Bound>) -> AnnealResult<Self> {
        validate("parameter", &params)?;
        self.params = Some(params);
        Ok(self)
    }

    /// Check the lengths against `D` and `|Pidx|`.
    pub fn check_dims(&self, dim: usize, n_estimated: usize) -> AnnealResult<()> {
        if let Some(s) = &self.state {
            if s.len() != dim {
                return Err(AnnealError::ShapeMismatch {
                    what: "state bounds",
                    expected: vec![dim],
                    found: vec![s.len()],
                });
            }
        }
        if let Some(p) = &self.params {
            if p.len() != n_estimated {
                return Err(AnnealError::ShapeMismatch {
                    what: "parameter bounds",
                    expected: vec![n_estimated],
                    found: vec![p.len()],
                });
            }
        }
        Ok(())
    }

    /// Bound for state component `k`.
    pub fn state_bound(&self, k: usize) -> Bound {
        self.state.as_ref().and_then(|s| s.get(k).copied()).unwrap_or(UNBOUNDED)
    }

    /// Bound for the `pos`-th estimated parameter (position in `Pidx`).
    pub fn param_bound(&self, pos: usize) -> Bound {
        self.params.as_ref().and_then(|p| p.get(pos).copied()).unwrap_or(UNBOUNDED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenated_bounds_split_at_dimension() {
        let mut all = vec![(-25.0, 25.0); 3];
        all.extend([(0.0, 30.0), (0.0, 30.0)]);
        let spec = BoundsSpec::from_concatenated(&all, 3).expect("valid bounds");
        assert_eq!(spec.state_bound(2), (-25.0, 25.0));
        assert_eq!(spec.param_bound(1), (0.0, 30.0));
        assert!(spec.check_dims(3, 2).is_ok());
        assert!(matches!(spec.check_dims(3, 1), Err(AnnealError::ShapeMismatch { .. })));
    }

    #[test]
    fn inverted_bounds_are_configuration_errors() {
        let err = BoundsSpec::new(vec![(1.0, -1.0)], vec![]).expect_err("low > high");
        assert!(err.is_configuration());
    }

    #[test]
    // Purpose
    // -------
    // A zero-width box pins its slot, so it must sit at a finite value.
    //
    // Given
    // -----
    // - State bounds `(∞, ∞)`, parameter bounds `(−∞, −∞)`, and a finite
    //   pin `(2, 2)` next to a one-sided box `(0, ∞)`.
    //
    // Expect
    // ------
    // - Both infinite pins are rejected with their family and index; the
    //   finite pin and the one-sided box are accepted.
    fn infinite_pins_are_rejected() {
        let inf = f64::INFINITY;
        assert!(matches!(
            BoundsSpec::new(vec![(0.0, 1.0), (inf, inf)], vec![]),
            Err(AnnealError::InvalidBounds { what: "state", index: 1, .. })
        ));
        assert!(matches!(
            BoundsSpec::new(vec![], vec![(-inf, -inf)]),
            Err(AnnealError::InvalidBounds { what: "parameter", index: 0, .. })
        ));
        assert!(BoundsSpec::new(vec![(2.0, 2.0)], vec![(0.0, inf)]).is_ok());
    }

    #[test]
    fn unbounded_spec_reports_infinite_boxes() {
        let spec = BoundsSpec::unbounded();
        assert_eq!(spec.state_bound(0), UNBOUNDED);
        assert_eq!(spec.param_bound(4), UNBOUNDED);
        assert!(spec.check_dims(10, 3).is_ok());
    }
}
