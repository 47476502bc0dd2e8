//! Reference models.
use crate::annealing::{
    errors::{AnnealError, AnnealResult},
    models::dynamics::Dynamics,
};
use crate::autodiff::Scalar;

/// Lorenz-96 on a ring of `D ≥ 4` sites:
///
/// `dx_k/dt = x_{k-1} (x_{k+1} − x_{k-2}) − x_k + F`, indices mod `D`,
///
/// with forcing `F = k1 + 100·k2²` from the two parameters `(k1, k2)`.
/// Setting `k2 = 0` gives the classic constant-forcing system with `F = k1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lorenz96 {
    dim: usize,
}

impl Lorenz96 {
    /// # Errors
    /// [`AnnealError::InvalidDimension`] for `dim < 4`.
    pub fn new(dim: usize) -> AnnealResult<Self> {
        if dim < 4 {
            return Err(AnnealError::InvalidDimension { dim });
        }
        Ok(Self { dim })
    }
}

impl Dynamics for Lorenz96 {
    fn dim(&self) -> usize {
        self.dim
    }

    fn n_params(&self) -> usize {
        2
    }

    fn rhs<S: Scalar>(&self, _t: f64, x: &[S], p: &[S], out: &mut [S]) {
        let d = self.dim;
        let forcing = p[0] + p[1] * p[1] * 100.0;
        for k in 0..d {
            let prev = x[(k + d - 1) % d];
            let next = x[(k + 1) % d];
            let prev2 = x[(k + d - 2) % d];
            out[k] = prev * (next - prev2) - x[k] + forcing;
        }
    }
}

/// Independent exponential decay `dx_k/dt = −k·x_k` with one rate `k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearDecay {
    dim: usize,
}

impl LinearDecay {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Dynamics for LinearDecay {
    fn dim(&self) -> usize {
        self.dim
    }

    fn n_params(&self) -> usize {
        1
    }

    fn rhs<S: Scalar>(&self, _t: f64, x: &[S], p: &[S], out: &mut [S]) {
        for (o, &xk) in out.iter_mut().zip(x.iter()) {
            *o = -(p[0] * xk);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autodiff::Dual;

    #[test]
    // Purpose
    // -------
    // The ring indexing must wrap at both ends.
    //
    // Given
    // -----
    // - D = 5, x = (1, 2, 3, 4, 5), k1 = 8, k2 = 0.
    //
    // Expect
    // ------
    // - k = 0: x4 (x1 − x3) − x0 + 8 = 5·(2 − 4) − 1 + 8 = −3.
    // - k = 4: x3 (x0 − x2) − x4 + 8 = 4·(1 − 3) − 5 + 8 = −5.
    fn lorenz96_wraps_neighbors() {
        // Arrange
        let model = Lorenz96::new(5).expect("valid dimension");
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let mut out = [0.0; 5];

        // Act
        model.rhs(0.0, &x, &[8.0, 0.0], &mut out);

        // Assert
        assert_eq!(out[0], -3.0);
        assert_eq!(out[4], -5.0);
    }

    #[test]
    fn lorenz96_forcing_uses_squared_second_parameter() {
        let model = Lorenz96::new(4).expect("valid dimension");
        let x = [0.0; 4];
        let mut out = [0.0; 4];
        model.rhs(0.0, &x, &[1.0, 0.5], &mut out);
        assert_eq!(out, [26.0; 4]);

        let p = [Dual::constant(1.0), Dual::var(0.5)];
        let xd = [Dual::constant(0.0); 4];
        let mut outd = [Dual::default(); 4];
        model.rhs(0.0, &xd, &p, &mut outd);
        // dF/dk2 = 200 k2
        assert_eq!(outd[2].dot, 100.0);
    }

    #[test]
    fn small_rings_are_rejected() {
        assert_eq!(Lorenz96::new(3), Err(AnnealError::InvalidDimension { dim: 3 }));
    }

    #[test]
    fn decay_rate_scales_every_component() {
        let mut out = [0.0; 2];
        LinearDecay::new(2).rhs(0.0, &[2.0, -4.0], &[0.25], &mut out);
        assert_eq!(out, [-0.5, 1.0]);
    }
}
