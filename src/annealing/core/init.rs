//! Random initial guesses.
//!
//! Draws starting paths and parameters uniformly within finite per-component
//! ranges. A `seed` makes the draw reproducible; `None` seeds from entropy.
use crate::annealing::{
    core::params::ParameterSet,
    errors::{AnnealError, AnnealResult},
};
use crate::optimization::minimizer::Bound;
use ndarray::{Array1, Array2};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn check_ranges(what: &'static str, ranges: &[Bound]) -> AnnealResult<()> {
    for (index, &(low, high)) in ranges.iter().enumerate() {
        if !(low.is_finite() && high.is_finite() && low <= high) {
            return Err(AnnealError::InvalidBounds { what, index, low, high });
        }
    }
    Ok(())
}

fn draw(rng: &mut StdRng, (low, high): Bound) -> f64 {
    if low == high { low } else { rng.gen_range(low..high) }
}

/// `[n_times, ranges.len()]` path with column `k` drawn from `ranges[k]`.
///
/// # Errors
/// [`AnnealError::InvalidBounds`] for an infinite or inverted range.
pub fn random_path(n_times: usize, ranges: &[Bound], seed: Option<u64>) -> AnnealResult<Array2<f64>> {
    check_ranges("initial path range", ranges)?;
    let mut rng = rng_from(seed);
    Ok(Array2::from_shape_fn((n_times, ranges.len()), |(_, k)| draw(&mut rng, ranges[k])))
}

/// Parameters with entry `j` drawn from `ranges[j]`.
///
/// `n_times = Some(N)` yields a time-varying set with an independent draw per
/// time; `None` yields a constant set.
///
/// # Errors
/// [`AnnealError::InvalidBounds`] for an infinite or inverted range.
pub fn random_params(
    ranges: &[Bound], n_times: Option<usize>, seed: Option<u64>,
) -> AnnealResult<ParameterSet> {
    check_ranges("initial parameter range", ranges)?;
    let mut rng = rng_from(seed);
    Ok(match n_times {
        Some(n) => ParameterSet::TimeVarying(Array2::from_shape_fn((n, ranges.len()), |(_, j)| {
            draw(&mut rng, ranges[j])
        })),
        None => ParameterSet::Constant(Array1::from_shape_fn(ranges.len(), |j| draw(&mut rng, ranges[j]))),
    })
}
