//! Model parameters: one vector for the whole run, or one vector per time.
use crate::annealing::errors::{AnnealError, AnnealResult};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Time-invariant or time-varying parameter values.
///
/// - `Constant(p)`: `p.len() == Np`, shared by every time.
/// - `TimeVarying(P)`: `P` has shape `[N, Np]`; row `n` applies at time `n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterSet {
    Constant(Array1<f64>),
    TimeVarying(Array2<f64>),
}

impl ParameterSet {
    pub fn n_params(&self) -> usize {
        match self {
            ParameterSet::Constant(p) => p.len(),
            ParameterSet::TimeVarying(p) => p.ncols(),
        }
    }

    pub fn is_time_varying(&self) -> bool {
        matches!(self, ParameterSet::TimeVarying(_))
    }

    /// Parameter vector in effect at time index `n`.
    pub fn at(&self, n: usize) -> ArrayView1<'_, f64> {
        match self {
            ParameterSet::Constant(p) => p.view(),
            ParameterSet::TimeVarying(p) => p.row(n),
        }
    }

    /// `[n_times, Np]` matrix, broadcasting a constant vector.
    pub fn to_matrix(&self, n_times: usize) -> Array2<f64> {
        match self {
            ParameterSet::Constant(p) => Array2::from_shape_fn((n_times, p.len()), |(_, j)| p[j]),
            ParameterSet::TimeVarying(p) => p.clone(),
        }
    }

    /// Check the parameter count, the row count of a time-varying set, and
    /// finiteness.
    pub fn validate(&self, n_params: usize, n_times: usize) -> AnnealResult<()> {
        if self.n_params() != n_params {
            return Err(AnnealError::ShapeMismatch {
                what: "parameter set",
                expected: vec![n_params],
                found: vec![self.n_params()],
            });
        }
        match self {
            ParameterSet::Constant(p) => {
                if let Some((j, &value)) = p.indexed_iter().find(|(_, v)| !v.is_finite()) {
                    return Err(AnnealError::NonFiniteInput { what: "parameter", index: vec![j], value });
                }
            }
            ParameterSet::TimeVarying(p) => {
                if p.nrows() != n_times {
                    return Err(AnnealError::ShapeMismatch {
                        what: "time-varying parameter set",
                        expected: vec![n_times, n_params],
                        found: p.shape().to_vec(),
                    });
                }
                crate::annealing::core::data::check_finite("parameter", p.view())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn constant_set_broadcasts_over_time() {
        let p = ParameterSet::Constant(array![8.0, 0.1]);
        assert_eq!(p.at(5), array![8.0, 0.1]);
        assert_eq!(p.to_matrix(3), array![[8.0, 0.1], [8.0, 0.1], [8.0, 0.1]]);
        assert!(p.validate(2, 100).is_ok());
    }

    #[test]
    fn time_varying_set_checks_row_count() {
        let p = ParameterSet::TimeVarying(array![[1.0], [2.0], [3.0]]);
        assert_eq!(p.at(1), array![2.0]);
        assert!(p.validate(1, 3).is_ok());
        assert!(matches!(p.validate(1, 4), Err(AnnealError::ShapeMismatch { .. })));
        assert!(matches!(p.validate(2, 3), Err(AnnealError::ShapeMismatch { .. })));
    }

    #[test]
    fn non_finite_parameters_are_rejected() {
        let p = ParameterSet::Constant(array![1.0, f64::NAN]);
        assert!(matches!(p.validate(2, 1), Err(AnnealError::NonFiniteInput { .. })));
    }
}
