//! Variable layout: mapping between (path, parameters) and the flat vectors
//! the minimizer sees.
//!
//! Purpose
//! -------
//! Fix, once per run, where every path entry and parameter entry lives in a
//! flat "full" vector, which of those slots the optimizer may move, and the
//! box bound of each free slot.
//!
//! Key behaviors
//! -------------
//! - Full vector: path row-major first (`n·D + k`), then the parameter block.
//!   A constant set occupies `N·D + j`; a time-varying set occupies
//!   `N·D + n·Np + j`.
//! - Free vector: path slots, then estimated parameter slots (`Pidx` only),
//!   both in full-vector order. Slots whose bound has zero width are pinned
//!   at `low` and excluded.
//! - `gather`/`scatter` move values between the two vectors; fixed
//!   parameters and pinned slots keep whatever the full vector holds.
//!
//! Invariants & assumptions
//! ------------------------
//! - The layout never changes during a run; every rung uses the same
//!   free-slot order, so one rung's optimum is the next rung's start verbatim.
use crate::annealing::{
    core::{bounds::BoundsSpec, indices::ParamIndex, params::ParameterSet},
    errors::{AnnealError, AnnealResult},
};
use crate::optimization::minimizer::Bound;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

#[derive(Debug, Clone, PartialEq)]
pub struct VariableLayout {
    n_times: usize,
    dim: usize,
    n_params: usize,
    time_varying: bool,
    free: Vec<usize>,
    free_bounds: Vec<Bound>,
    pinned: Vec<(usize, f64)>,
}

impl VariableLayout {
    /// Build the layout for `n_times × dim` paths and a parameter set shaped
    /// like `params`.
    ///
    /// # Errors
    /// [`AnnealError::ShapeMismatch`] if the bounds do not match `dim` and
    /// `|Pidx|`, or if `Pidx` was built for a different parameter count.
    pub fn new(
        n_times: usize, dim: usize, params: &ParameterSet, pidx: &ParamIndex, bounds: &BoundsSpec,
    ) -> AnnealResult<Self> {
        let n_params = params.n_params();
        if pidx.n_params() != n_params {
            return Err(AnnealError::ShapeMismatch {
                what: "estimated parameter index",
                expected: vec![n_params],
                found: vec![pidx.n_params()],
            });
        }
        bounds.check_dims(dim, pidx.len())?;

        let time_varying = params.is_time_varying();
        let mut layout = Self {
            n_times,
            dim,
            n_params,
            time_varying,
            free: Vec::new(),
            free_bounds: Vec::new(),
            pinned: Vec::new(),
        };

        for n in 0..n_times {
            for k in 0..dim {
                layout.push(n * dim + k, bounds.state_bound(k));
            }
        }
        let param_rows = if time_varying { n_times } else { 1 };
        for n in 0..param_rows {
            for (pos, &j) in pidx.indices().iter().enumerate() {
                let slot = n_times * dim + n * n_params + j;
                layout.push(slot, bounds.param_bound(pos));
            }
        }
        // Pidx may be unsorted; keep the free vector in full-vector order.
        let mut order: Vec<usize> = (0..layout.free.len()).collect();
        order.sort_by_key(|&i| layout.free[i]);
        layout.free = order.iter().map(|&i| layout.free[i]).collect();
        layout.free_bounds = order.iter().map(|&i| layout.free_bounds[i]).collect();
        Ok(layout)
    }

    fn push(&mut self, slot: usize, bound: Bound) {
        if bound.0 == bound.1 {
            self.pinned.push((slot, bound.0));
        } else {
            self.free.push(slot);
            self.free_bounds.push(bound);
        }
    }

    pub fn n_times(&self) -> usize {
        self.n_times
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn n_params(&self) -> usize {
        self.n_params
    }

    pub fn is_time_varying(&self) -> bool {
        self.time_varying
    }

    /// Length of the full vector.
    pub fn n_full(&self) -> usize {
        let rows = if self.time_varying { self.n_times } else { 1 };
        self.n_times * self.dim + rows * self.n_params
    }

    /// Number of optimizer variables.
    pub fn n_free(&self) -> usize {
        self.free.len()
    }

    /// Full-vector index of each free variable.
    pub fn free_slots(&self) -> &[usize] {
        &self.free
    }

    /// Box bound of each free variable, aligned with [`free_slots`](Self::free_slots).
    pub fn free_bounds(&self) -> &[Bound] {
        &self.free_bounds
    }

    /// `(slot, value)` for every zero-width slot.
    pub fn pinned(&self) -> &[(usize, f64)] {
        &self.pinned
    }

    /// Offset of the parameter block in the full vector.
    pub fn param_offset(&self) -> usize {
        self.n_times * self.dim
    }

    /// Flatten a path and a parameter set into a full vector.
    pub fn pack(&self, path: ArrayView2<f64>, params: &ParameterSet) -> Array1<f64> {
        let mut full = Array1::zeros(self.n_full());
        for ((n, k), &v) in path.indexed_iter() {
            full[n * self.dim + k] = v;
        }
        let offset = self.param_offset();
        match params {
            ParameterSet::Constant(p) => {
                for (j, &v) in p.iter().enumerate() {
                    full[offset + j] = v;
                }
            }
            ParameterSet::TimeVarying(p) => {
                for ((n, j), &v) in p.indexed_iter() {
                    full[offset + n * self.n_params + j] = v;
                }
            }
        }
        full
    }

    /// Split a full vector back into a `[N, D]` path and a parameter set of
    /// the layout's kind.
    pub fn unpack(&self, full: ArrayView1<f64>) -> (Array2<f64>, ParameterSet) {
        let path = Array2::from_shape_fn((self.n_times, self.dim), |(n, k)| full[n * self.dim + k]);
        let offset = self.param_offset();
        let params = if self.time_varying {
            ParameterSet::TimeVarying(Array2::from_shape_fn((self.n_times, self.n_params), |(n, j)| {
                full[offset + n * self.n_params + j]
            }))
        } else {
            ParameterSet::Constant(Array1::from_shape_fn(self.n_params, |j| full[offset + j]))
        };
        (path, params)
    }

    /// Free-variable values read out of a full vector.
    pub fn gather(&self, full: ArrayView1<f64>) -> Array1<f64> {
        self.free.iter().map(|&slot| full[slot]).collect()
    }

    /// Write free-variable values into a full vector.
    pub fn scatter(&self, free: ArrayView1<f64>, full: &mut Array1<f64>) {
        for (&slot, &v) in self.free.iter().zip(free.iter()) {
            full[slot] = v;
        }
    }

    /// Set every pinned slot to its bound.
    pub fn apply_pins(&self, full: &mut Array1<f64>) {
        for &(slot, value) in &self.pinned {
            full[slot] = value;
        }
    }

    /// Project free slots into their boxes and set pinned slots.
    ///
    /// Returns the number of free slots that moved.
    pub fn project(&self, full: &mut Array1<f64>) -> usize {
        self.apply_pins(full);
        let mut moved = 0;
        for (&slot, &(low, high)) in self.free.iter().zip(self.free_bounds.iter()) {
            let v = full[slot];
            let clamped = v.clamp(low, high);
            if clamped != v {
                full[slot] = clamped;
                moved += 1;
            }
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Full-vector offsets for constant and time-varying parameter sets.
    // - Exclusion of fixed parameters and zero-width slots from the free vector.
    // - Projection of out-of-box values.
    // -------------------------------------------------------------------------

    fn pidx(indices: &[usize], n: usize) -> ParamIndex {
        ParamIndex::new(indices, n).expect("valid Pidx")
    }

    #[test]
    // Purpose
    // -------
    // Only estimated parameters join the free vector; fixed ones keep their
    // packed values through a gather/scatter cycle.
    //
    // Given
    // -----
    // - N = 3, D = 2, constant parameters `[0.5, 7.0]` with `Pidx = {0}`.
    //
    // Expect
    // ------
    // - 6 path slots plus slot 6 are free; slot 7 (fixed) is untouched.
    fn constant_params_expose_only_estimated_slots() {
        // Arrange
        let params = ParameterSet::Constant(array![0.5, 7.0]);
        let layout = VariableLayout::new(3, 2, &params, &pidx(&[0], 2), &BoundsSpec::unbounded())
            .expect("valid layout");
        let path = Array2::from_shape_fn((3, 2), |(n, k)| (n * 2 + k) as f64);

        // Act
        let mut full = layout.pack(path.view(), &params);
        let mut free = layout.gather(full.view());
        free.mapv_inplace(|v| v + 100.0);
        layout.scatter(free.view(), &mut full);
        let (new_path, new_params) = layout.unpack(full.view());

        // Assert
        assert_eq!(layout.n_full(), 8);
        assert_eq!(layout.free_slots(), &[0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(new_path[[2, 1]], 105.0);
        assert_eq!(new_params, ParameterSet::Constant(array![100.5, 7.0]));
    }

    #[test]
    fn time_varying_params_use_one_block_per_time() {
        let params = ParameterSet::TimeVarying(array![[1.0, 2.0], [3.0, 4.0]]);
        let layout = VariableLayout::new(2, 1, &params, &pidx(&[1], 2), &BoundsSpec::unbounded())
            .expect("valid layout");
        assert_eq!(layout.n_full(), 2 + 4);
        // Path slots 0, 1 then parameter 1 at times 0 and 1.
        assert_eq!(layout.free_slots(), &[0, 1, 3, 5]);
        let full = layout.pack(array![[9.0], [8.0]].view(), &params);
        assert_eq!(layout.unpack(full.view()).1, params);
    }

    #[test]
    // Purpose
    // -------
    // Zero-width bounds pin a slot at its bound and remove it from the free
    // vector.
    //
    // Given
    // -----
    // - D = 2 with component 1 bounded to `[3, 3]`; one parameter in `[0, 2]`.
    //
    // Expect
    // ------
    // - Component 1 never appears among free slots; `project` writes 3.0 there
    //   and clamps the parameter into its box.
    fn zero_width_bounds_pin_slots() {
        // Arrange
        let params = ParameterSet::Constant(array![5.0]);
        let bounds = BoundsSpec::new(vec![(-1.0, 1.0), (3.0, 3.0)], vec![(0.0, 2.0)])
            .expect("valid bounds");
        let layout =
            VariableLayout::new(2, 2, &params, &pidx(&[0], 1), &bounds).expect("valid layout");
        let mut full = layout.pack(array![[0.5, 0.0], [4.0, 0.0]].view(), &params);

        // Act
        let moved = layout.project(&mut full);

        // Assert
        assert_eq!(layout.free_slots(), &[0, 2, 4]);
        assert_eq!(layout.pinned().len(), 2);
        assert_eq!(full.to_vec(), vec![0.5, 3.0, 1.0, 3.0, 2.0]);
        assert_eq!(moved, 2);
    }

    #[test]
    fn mismatched_bounds_are_rejected() {
        let params = ParameterSet::Constant(array![1.0]);
        let bounds = BoundsSpec::new(vec![(0.0, 1.0)], vec![]).expect("valid bounds");
        let err = VariableLayout::new(2, 1, &params, &pidx(&[0], 1), &bounds)
            .expect_err("missing parameter bound");
        assert!(matches!(err, AnnealError::ShapeMismatch { .. }));
    }
}
