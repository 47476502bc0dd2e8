//! Beta ladder and the model-precision schedule `RF(β) = RF0 ∘ α^β`.
use crate::annealing::errors::{AnnealError, AnnealResult};
use ndarray::Array1;

/// Strictly increasing, finite, non-negative sequence of rung exponents.
#[derive(Debug, Clone, PartialEq)]
pub struct BetaLadder {
    betas: Vec<f64>,
}

impl BetaLadder {
    /// # Errors
    /// [`AnnealError::InvalidLadder`] for an empty ladder, a non-finite or
    /// negative entry, or a rung not above its predecessor.
    pub fn new(betas: Vec<f64>) -> AnnealResult<Self> {
        if betas.is_empty() {
            return Err(AnnealError::InvalidLadder {
                index: 0,
                value: f64::NAN,
                reason: "ladder must contain at least one rung",
            });
        }
        for (index, &value) in betas.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(AnnealError::InvalidLadder {
                    index,
                    value,
                    reason: "rungs must be finite and non-negative",
                });
            }
            if index > 0 && value <= betas[index - 1] {
                return Err(AnnealError::InvalidLadder {
                    index,
                    value,
                    reason: "rungs must be strictly increasing",
                });
            }
        }
        Ok(Self { betas })
    }

    /// `n` evenly spaced rungs from `start` to `stop` inclusive.
    pub fn linspace(start: f64, stop: f64, n: usize) -> AnnealResult<Self> {
        let betas = match n {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (stop - start) / (n - 1) as f64;
                (0..n).map(|i| start + i as f64 * step).collect()
            }
        };
        Self::new(betas)
    }

    /// Integer rungs `0, 1, …, n-1`.
    pub fn integers(n: usize) -> AnnealResult<Self> {
        Self::new((0..n).map(|b| b as f64).collect())
    }

    pub fn betas(&self) -> &[f64] {
        &self.betas
    }

    pub fn len(&self) -> usize {
        self.betas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.betas.is_empty()
    }
}

/// Model precision at rung exponent `beta`: `rf0_k · alpha^beta` per component.
pub fn model_precision(rf0: &Array1<f64>, alpha: f64, beta: f64) -> Array1<f64> {
    let scale = alpha.powf(beta);
    rf0.mapv(|r| r * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn linspace_matches_the_usual_0_to_30_ladder() {
        let ladder = BetaLadder::linspace(0.0, 30.0, 31).expect("valid ladder");
        assert_eq!(ladder.len(), 31);
        assert_relative_eq!(ladder.betas()[7], 7.0, epsilon = 1e-12);
        assert_relative_eq!(ladder.betas()[30], 30.0, epsilon = 1e-12);
    }

    #[test]
    fn unordered_or_negative_rungs_are_rejected() {
        assert!(BetaLadder::new(vec![]).is_err());
        assert!(matches!(
            BetaLadder::new(vec![0.0, 2.0, 2.0]),
            Err(AnnealError::InvalidLadder { index: 2, .. })
        ));
        assert!(matches!(
            BetaLadder::new(vec![-1.0, 0.0]),
            Err(AnnealError::InvalidLadder { index: 0, .. })
        ));
        assert!(BetaLadder::new(vec![0.0, f64::INFINITY]).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Higher rungs must weight the model term strictly more.
    //
    // Given
    // -----
    // - `RF0 = (4e-6, 1.0)`, `alpha = 2`, every pair of rungs in `0..=30`.
    //
    // Expect
    // ------
    // - `RF(β_j) > RF(β_i)` componentwise whenever `β_j > β_i`.
    fn model_precision_increases_along_the_ladder() {
        let rf0 = array![4e-6, 1.0];
        let ladder = BetaLadder::integers(31).expect("valid ladder");
        let schedule: Vec<_> =
            ladder.betas().iter().map(|&b| model_precision(&rf0, 2.0, b)).collect();
        for i in 0..schedule.len() {
            for j in (i + 1)..schedule.len() {
                for k in 0..2 {
                    assert!(schedule[j][k] > schedule[i][k]);
                }
            }
        }
        assert_relative_eq!(schedule[30][0], 4e-6 * 2f64.powi(30), max_relative = 1e-12);
    }
}
