//! Forward sweeps: exact local Jacobians of `Scalar`-generic block functions.
//!
//! Purpose
//! -------
//! Differentiate a small block function `g: ℝ^{n_in} → ℝ^{n_out}` by running
//! it once per input with that input seeded as a [`Dual`] variable. The
//! sweep keeps its seed/output buffers and the resulting Jacobian between
//! calls so that per-interval differentiation inside the action gradient does
//! not allocate.
//!
//! Conventions
//! -----------
//! - `jacobian[[k, j]] = ∂g_k / ∂z_j`.
//! - The block writes into an output slice that the sweep zero-fills before
//!   each pass; the block must overwrite every output it owns.
use crate::autodiff::dual::Dual;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Reusable forward-mode sweep for blocks with fixed input/output sizes.
#[derive(Debug, Clone)]
pub struct ForwardSweep {
    n_in: usize,
    n_out: usize,
    seeds: Vec<Dual>,
    outputs: Vec<Dual>,
    values: Array1<f64>,
    jacobian: Array2<f64>,
}

impl ForwardSweep {
    /// Allocate buffers for a block with `n_in` inputs and `n_out` outputs.
    pub fn new(n_in: usize, n_out: usize) -> Self {
        Self {
            n_in,
            n_out,
            seeds: vec![Dual::default(); n_in],
            outputs: vec![Dual::default(); n_out],
            values: Array1::zeros(n_out),
            jacobian: Array2::zeros((n_out, n_in)),
        }
    }

    pub fn n_in(&self) -> usize {
        self.n_in
    }

    pub fn n_out(&self) -> usize {
        self.n_out
    }

    /// Evaluate `block` at `z` and return `(g(z), ∂g/∂z)`.
    ///
    /// Runs `max(n_in, 1)` passes. `z.len()` must equal `n_in`; the block
    /// receives seeded inputs of that length and an output buffer of length
    /// `n_out`.
    pub fn value_and_jacobian<F>(
        &mut self, z: &[f64], mut block: F,
    ) -> (ArrayView1<'_, f64>, ArrayView2<'_, f64>)
    where
        F: FnMut(&[Dual], &mut [Dual]),
    {
        debug_assert_eq!(z.len(), self.n_in, "sweep input length mismatch");
        for (seed, &v) in self.seeds.iter_mut().zip(z.iter()) {
            *seed = Dual::constant(v);
        }

        if self.n_in == 0 {
            self.run_pass(&mut block);
            for (k, out) in self.outputs.iter().enumerate() {
                self.values[k] = out.val;
            }
            return (self.values.view(), self.jacobian.view());
        }

        for j in 0..self.n_in {
            self.seeds[j].dot = 1.0;
            self.run_pass(&mut block);
            self.seeds[j].dot = 0.0;
            for (k, out) in self.outputs.iter().enumerate() {
                self.jacobian[[k, j]] = out.dot;
                if j == 0 {
                    self.values[k] = out.val;
                }
            }
        }
        (self.values.view(), self.jacobian.view())
    }

    fn run_pass<F>(&mut self, block: &mut F)
    where
        F: FnMut(&[Dual], &mut [Dual]),
    {
        self.outputs.fill(Dual::default());
        block(&self.seeds, &mut self.outputs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autodiff::scalar::Scalar;
    use approx::assert_relative_eq;

    fn block<S: Scalar>(z: &[S], out: &mut [S]) {
        // g0 = z0 * z1 + sin(z2), g1 = z0² - 3 z2
        out[0] = z[0] * z[1] + z[2].sin();
        out[1] = z[0] * z[0] - z[2] * 3.0;
    }

    #[test]
    // Purpose
    // -------
    // Check that a sweep assembles the exact Jacobian of a small nonlinear
    // block, column by column.
    //
    // Given
    // -----
    // - `g(z) = [z0 z1 + sin z2, z0² − 3 z2]` at `z = (1.5, -2.0, 0.4)`.
    //
    // Expect
    // ------
    // - Values and every Jacobian entry match the closed forms.
    fn sweep_matches_closed_form_jacobian() {
        let mut sweep = ForwardSweep::new(3, 2);
        let z = [1.5, -2.0, 0.4];

        let (vals, jac) = sweep.value_and_jacobian(&z, |zs, out| block(zs, out));

        assert_relative_eq!(vals[0], 1.5 * -2.0 + 0.4_f64.sin(), epsilon = 1e-14);
        assert_relative_eq!(vals[1], 2.25 - 1.2, epsilon = 1e-14);
        assert_relative_eq!(jac[[0, 0]], -2.0, epsilon = 1e-14);
        assert_relative_eq!(jac[[0, 1]], 1.5, epsilon = 1e-14);
        assert_relative_eq!(jac[[0, 2]], 0.4_f64.cos(), epsilon = 1e-14);
        assert_relative_eq!(jac[[1, 0]], 3.0, epsilon = 1e-14);
        assert_relative_eq!(jac[[1, 1]], 0.0, epsilon = 1e-14);
        assert_relative_eq!(jac[[1, 2]], -3.0, epsilon = 1e-14);
    }

    #[test]
    fn sweep_is_reusable_across_points() {
        let mut sweep = ForwardSweep::new(3, 2);
        let _ = sweep.value_and_jacobian(&[1.0, 1.0, 1.0], |zs, out| block(zs, out));
        let (vals, jac) = sweep.value_and_jacobian(&[0.0, 2.0, 0.0], |zs, out| block(zs, out));

        assert_relative_eq!(vals[0], 0.0, epsilon = 1e-14);
        assert_relative_eq!(jac[[0, 0]], 2.0, epsilon = 1e-14);
        assert_relative_eq!(jac[[1, 0]], 0.0, epsilon = 1e-14);
    }

    #[test]
    fn empty_input_block_still_reports_values() {
        let mut sweep = ForwardSweep::new(0, 1);
        let (vals, jac) = sweep.value_and_jacobian(&[], |_, out| out[0] = Dual::constant(7.0));
        assert_relative_eq!(vals[0], 7.0);
        assert_eq!(jac.dim(), (1, 0));
    }
}
