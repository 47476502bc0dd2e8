//! Observation ingestion.
//!
//! An [`Observations`] value holds the measured components `y[n, i]` at `N`
//! uniformly spaced times. It is built once, validated once, and read-only
//! for the rest of the run.
use crate::annealing::errors::{AnnealError, AnnealResult};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};

/// Tolerance on each step, relative to the first step `dt`.
const SPACING_RTOL: f64 = 1e-8;
/// Rounding allowance on each step, in units of `ε · max |t|`.
const SPACING_ULPS: f64 = 4.0;

/// Measured time series aligned with the model path.
#[derive(Debug, Clone, PartialEq)]
pub struct Observations {
    times: Array1<f64>,
    values: Array2<f64>,
    dt: f64,
}

impl Observations {
    /// Build from an explicit start time, spacing, and `[N, L]` values.
    ///
    /// # Errors
    /// - [`AnnealError::TooFewTimePoints`] when `N < 2`.
    /// - [`AnnealError::NonUniformTimestamps`] when `dt` is not finite and
    ///   positive.
    /// - [`AnnealError::NonFiniteInput`] for NaN/∞ values.
    pub fn new(t0: f64, dt: f64, values: Array2<f64>) -> AnnealResult<Self> {
        let n = values.nrows();
        if n < 2 {
            return Err(AnnealError::TooFewTimePoints { found: n });
        }
        if !(dt.is_finite() && dt > 0.0) || !t0.is_finite() {
            return Err(AnnealError::NonUniformTimestamps { index: 1, expected_dt: dt, found_dt: dt });
        }
        check_finite("observation", values.view())?;
        let times = Array1::from_shape_fn(n, |i| t0 + i as f64 * dt);
        Ok(Self { times, values, dt })
    }

    /// Build from a table whose first column is timestamps and whose
    /// remaining `L` columns are the observed components.
    ///
    /// # Errors
    /// - [`AnnealError::ShapeMismatch`] for a table with no columns.
    /// - [`AnnealError::TooFewTimePoints`] when fewer than two rows.
    /// - [`AnnealError::NonUniformTimestamps`] when spacing is not constant
    ///   (tolerance `1e-8·dt` plus the rounding of the largest timestamp)
    ///   or not increasing.
    /// - [`AnnealError::NonFiniteInput`] for NaN/∞ entries.
    pub fn from_table(table: ArrayView2<f64>) -> AnnealResult<Self> {
        if table.ncols() == 0 {
            return Err(AnnealError::ShapeMismatch {
                what: "observation table",
                expected: vec![table.nrows(), 1],
                found: vec![table.nrows(), 0],
            });
        }
        let n = table.nrows();
        if n < 2 {
            return Err(AnnealError::TooFewTimePoints { found: n });
        }
        check_finite("observation table", table)?;

        let times = table.column(0).to_owned();
        let dt = times[1] - times[0];
        if dt <= 0.0 {
            return Err(AnnealError::NonUniformTimestamps { index: 1, expected_dt: dt, found_dt: dt });
        }
        let t_max = times.iter().fold(0.0_f64, |m, t| m.max(t.abs()));
        let tol = SPACING_RTOL * dt + SPACING_ULPS * f64::EPSILON * t_max;
        for i in 2..n {
            let step = times[i] - times[i - 1];
            if (step - dt).abs() > tol {
                return Err(AnnealError::NonUniformTimestamps {
                    index: i,
                    expected_dt: dt,
                    found_dt: step,
                });
            }
        }
        let values = table.slice(s![.., 1..]).to_owned();
        Ok(Self { times, values, dt })
    }

    pub fn n_times(&self) -> usize {
        self.values.nrows()
    }

    /// Number of observed components `L`.
    pub fn n_observed(&self) -> usize {
        self.values.ncols()
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn times(&self) -> ArrayView1<'_, f64> {
        self.times.view()
    }

    pub fn t0(&self) -> f64 {
        self.times[0]
    }

    /// `[N, L]` observed values.
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }
}

pub(crate) fn check_finite(what: &'static str, a: ArrayView2<f64>) -> AnnealResult<()> {
    match a.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((i, j), &value)) => Err(AnnealError::NonFiniteInput { what, index: vec![i, j], value }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // A well-formed table splits into times, spacing and values.
    //
    // Given
    // -----
    // - Three rows at t = 0.0, 0.025, 0.05 with two observed columns.
    //
    // Expect
    // ------
    // - `dt = 0.025`, `N = 3`, `L = 2`, values match the trailing columns.
    fn from_table_splits_time_column() {
        let table = array![[0.0, 1.0, 2.0], [0.025, 3.0, 4.0], [0.05, 5.0, 6.0]];

        let obs = Observations::from_table(table.view()).expect("valid table");

        assert_relative_eq!(obs.dt(), 0.025);
        assert_eq!(obs.n_times(), 3);
        assert_eq!(obs.n_observed(), 2);
        assert_eq!(obs.values(), array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
    }

    #[test]
    fn time_only_table_means_no_observed_components() {
        let table = array![[0.0], [0.1], [0.2]];
        let obs = Observations::from_table(table.view()).expect("valid table");
        assert_eq!(obs.n_observed(), 0);
    }

    #[test]
    fn non_uniform_spacing_is_rejected() {
        let table = array![[0.0, 1.0], [0.1, 1.0], [0.25, 1.0]];
        assert!(matches!(
            Observations::from_table(table.view()),
            Err(AnnealError::NonUniformTimestamps { index: 2, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // The spacing tolerance must scale with `dt`, not with the size of the
    // timestamps, so epoch-based clocks still catch irregular gaps.
    //
    // Given
    // -----
    // - Six rows from t = 1.7e9 in 1 s steps with a final 5 s step.
    // - Six rows from t = 1.7e9 in 0.1 s steps (inexact in binary).
    //
    // Expect
    // ------
    // - The 5 s gap is rejected at index 5; the regular grid is accepted.
    fn epoch_timestamps_keep_spacing_tight() {
        // Arrange
        let t0 = 1.7e9;
        let gapped = Array2::from_shape_fn((6, 2), |(i, j)| match (i, j) {
            (5, 0) => t0 + 9.0,
            (_, 0) => t0 + i as f64,
            _ => 1.0,
        });
        let regular = Array2::from_shape_fn((6, 2), |(i, j)| if j == 0 { t0 + 0.1 * i as f64 } else { 1.0 });

        // Act
        let gapped = Observations::from_table(gapped.view());
        let regular = Observations::from_table(regular.view());

        // Assert
        assert!(matches!(gapped, Err(AnnealError::NonUniformTimestamps { index: 5, .. })));
        assert!(regular.is_ok());
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert!(matches!(
            Observations::from_table(array![[0.0, 1.0]].view()),
            Err(AnnealError::TooFewTimePoints { found: 1 })
        ));
        assert!(matches!(
            Observations::new(0.0, 0.1, array![[1.0], [f64::NAN]]),
            Err(AnnealError::NonFiniteInput { .. })
        ));
        assert!(Observations::new(0.0, -0.1, array![[1.0], [2.0]]).is_err());
    }
}
