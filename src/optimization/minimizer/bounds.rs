//! Box handling between the caller's bounded coordinates `x` and the
//! solver's coordinates `u`.
//!
//! Under [`BoundStrategy::Transform`] each coordinate is reparameterized with
//! a [`BoxTransform`] so every solver iterate maps inside its box. Under
//! [`BoundStrategy::Clamp`] the solver works on `x` directly, evaluations use
//! the clamped point, and gradient components pushing outward from an active
//! bound are zeroed.
//!
//! Zero-width boxes (`low == high`) always evaluate at `low` and receive a
//! zero gradient, whichever strategy is active.
use crate::optimization::{
    errors::OptResult,
    minimizer::{
        traits::BoundStrategy,
        types::{Bound, Grad, Theta},
        validation::validate_bounds,
    },
    numerical_stability::{BoxTransform, BOUND_EPS},
};

/// Distance from a bound under which a clamped coordinate counts as active.
const ACTIVE_EPS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct BoxMap {
    strategy: BoundStrategy,
    bounds: Vec<Bound>,
    transforms: Vec<BoxTransform>,
}

impl BoxMap {
    /// Build the map for `dim` variables.
    ///
    /// `None` means every coordinate is unbounded.
    ///
    /// # Errors
    /// Propagates [`validate_bounds`] failures.
    pub fn new(bounds: Option<&[Bound]>, dim: usize, strategy: BoundStrategy) -> OptResult<Self> {
        let bounds = match bounds {
            Some(b) => {
                validate_bounds(b, dim)?;
                b.to_vec()
            }
            None => vec![(f64::NEG_INFINITY, f64::INFINITY); dim],
        };
        let transforms = bounds.iter().map(|&(lo, hi)| BoxTransform::from_bounds(lo, hi)).collect();
        Ok(Self { strategy, bounds, transforms })
    }

    pub fn dim(&self) -> usize {
        self.bounds.len()
    }

    pub fn bounds(&self) -> &[Bound] {
        &self.bounds
    }

    /// Clamp `x` into the box.
    pub fn project(&self, x: &Theta) -> Theta {
        let mut out = x.clone();
        for (v, &(lo, hi)) in out.iter_mut().zip(self.bounds.iter()) {
            *v = v.clamp(lo, hi);
        }
        out
    }

    /// Starting point in solver coordinates.
    ///
    /// Under `Transform`, a value sitting exactly on a finite bound has no
    /// finite preimage and is moved inward by [`BOUND_EPS`] relative to the
    /// box width (interval) or to `max(|bound|, 1)` (one-sided) first.
    /// `Clamp` starts from the projected point unchanged.
    pub fn to_inner(&self, x: &Theta) -> Theta {
        let x = self.project(x);
        match self.strategy {
            BoundStrategy::Clamp => x,
            BoundStrategy::Transform => {
                let mut u = x;
                for (v, t) in u.iter_mut().zip(self.transforms.iter()) {
                    *v = t.inverse(*v);
                }
                u
            }
        }
    }

    /// Point in caller coordinates for a solver iterate. Always inside the box.
    pub fn to_outer(&self, u: &Theta) -> Theta {
        match self.strategy {
            BoundStrategy::Clamp => self.project(u),
            BoundStrategy::Transform => {
                let mut x = u.clone();
                for (v, t) in x.iter_mut().zip(self.transforms.iter()) {
                    *v = t.forward(*v);
                }
                self.project(&x)
            }
        }
    }

    /// Chain a gradient taken at `x = to_outer(u)` back to solver coordinates.
    pub fn pull_gradient(&self, u: &Theta, x: &Theta, mut g: Grad) -> Grad {
        for i in 0..g.len() {
            let (lo, hi) = self.bounds[i];
            if lo == hi {
                g[i] = 0.0;
                continue;
            }
            match self.strategy {
                BoundStrategy::Transform => g[i] *= self.transforms[i].deriv(u[i]),
                BoundStrategy::Clamp => {
                    if (x[i] <= lo + ACTIVE_EPS && g[i] > 0.0)
                        || (x[i] >= hi - ACTIVE_EPS && g[i] < 0.0)
                    {
                        g[i] = 0.0;
                    }
                }
            }
        }
        g
    }
}
