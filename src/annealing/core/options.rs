//! Run configuration.
//!
//! [`AnnealOptions`] gathers every knob of a run into one immutable value.
//! Field-local checks happen in the constructors and `with_*` setters;
//! checks that need the model dimension, the index sets or the data length
//! happen once in `Annealer::new`.
use crate::annealing::{
    action::Discretization,
    core::{bounds::BoundsSpec, ladder::BetaLadder},
    errors::{AnnealError, AnnealResult},
};
use crate::optimization::minimizer::MinimizerOptions;
use ndarray::Array1;
use std::str::FromStr;

/// Precision weight: one value for every component, or one per component.
#[derive(Debug, Clone, PartialEq)]
pub enum Precision {
    Scalar(f64),
    PerComponent(Array1<f64>),
}

impl From<f64> for Precision {
    fn from(value: f64) -> Self {
        Precision::Scalar(value)
    }
}

impl From<Array1<f64>> for Precision {
    fn from(values: Array1<f64>) -> Self {
        Precision::PerComponent(values)
    }
}

impl Precision {
    fn validate(&self, what: &'static str) -> AnnealResult<()> {
        let bad = match self {
            Precision::Scalar(v) => (!(v.is_finite() && *v > 0.0)).then_some((0, *v)),
            Precision::PerComponent(vs) => vs
                .iter()
                .enumerate()
                .find(|(_, v)| !(v.is_finite() && **v > 0.0))
                .map(|(i, v)| (i, *v)),
        };
        match bad {
            Some((index, value)) => Err(AnnealError::InvalidPrecision { what, index, value }),
            None => Ok(()),
        }
    }

    /// Expand to exactly `len` weights.
    ///
    /// # Errors
    /// [`AnnealError::ShapeMismatch`] if a per-component vector has the
    /// wrong length.
    pub fn resolve(&self, what: &'static str, len: usize) -> AnnealResult<Array1<f64>> {
        match self {
            Precision::Scalar(v) => Ok(Array1::from_elem(len, *v)),
            Precision::PerComponent(vs) if vs.len() == len => Ok(vs.clone()),
            Precision::PerComponent(vs) => Err(AnnealError::ShapeMismatch {
                what,
                expected: vec![len],
                found: vec![vs.len()],
            }),
        }
    }
}

/// How the measurement and model terms are scaled.
///
/// - `Sum` (default): `ME = Σ RM_k (x − y)²`, `FE = (1/dt) Σ RF_k r_k²`.
/// - `Mean`: `ME` divided by `L·N_data`, `FE = Σ RF_k r_k² / (D·(N_model − 1))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    #[default]
    Sum,
    Mean,
}

impl FromStr for Normalization {
    type Err = AnnealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(Normalization::Sum),
            "mean" => Ok(Normalization::Mean),
            _ => Err(AnnealError::UnknownName { what: "normalization", name: s.to_string() }),
        }
    }
}

/// What to do when a rung's minimizer stops without meeting its tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonConvergencePolicy {
    /// Record the rung and continue from its best point.
    #[default]
    Continue,
    /// Record the rung, then stop the ladder with `RungNotConverged`.
    Abort,
}

impl FromStr for NonConvergencePolicy {
    type Err = AnnealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "continue" => Ok(NonConvergencePolicy::Continue),
            "abort" => Ok(NonConvergencePolicy::Abort),
            _ => Err(AnnealError::UnknownName { what: "non-convergence policy", name: s.to_string() }),
        }
    }
}

/// Immutable configuration of one annealing run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealOptions {
    /// Measurement precision `RM` (scalar or one per measured component).
    pub rm: Precision,
    /// Base model precision `RF0` (scalar or one per state component).
    pub rf0: Precision,
    /// Continuation base; `RF = RF0 · α^β`.
    pub alpha: f64,
    pub ladder: BetaLadder,
    pub discretization: Discretization,
    pub minimizer: MinimizerOptions,
    pub bounds: BoundsSpec,
    /// At the first rung only, copy observations into the measured slots of
    /// the initial path.
    pub init_to_data: bool,
    /// Model steps per observation interval (`m ≥ 1`).
    pub model_substeps: usize,
    pub normalization: Normalization,
    pub on_non_convergence: NonConvergencePolicy,
}

impl AnnealOptions {
    /// Options with the required weights and ladder; everything else takes
    /// its default (SimpsonHermite, default minimizer, unbounded,
    /// `init_to_data = false`, `m = 1`, `Sum`, `Continue`).
    ///
    /// # Errors
    /// - [`AnnealError::InvalidPrecision`] for non-positive or non-finite
    ///   weights.
    /// - [`AnnealError::InvalidAlpha`] unless `alpha` is finite and `> 1`.
    pub fn new(
        rm: impl Into<Precision>, rf0: impl Into<Precision>, alpha: f64, ladder: BetaLadder,
    ) -> AnnealResult<Self> {
        let rm = rm.into();
        let rf0 = rf0.into();
        rm.validate("measurement")?;
        rf0.validate("model")?;
        if !(alpha.is_finite() && alpha > 1.0) {
            return Err(AnnealError::InvalidAlpha { value: alpha });
        }
        Ok(Self {
            rm,
            rf0,
            alpha,
            ladder,
            discretization: Discretization::default(),
            minimizer: MinimizerOptions::default(),
            bounds: BoundsSpec::unbounded(),
            init_to_data: false,
            model_substeps: 1,
            normalization: Normalization::default(),
            on_non_convergence: NonConvergencePolicy::default(),
        })
    }

    pub fn with_discretization(mut self, discretization: Discretization) -> Self {
        self.discretization = discretization;
        self
    }

    pub fn with_minimizer(mut self, minimizer: MinimizerOptions) -> Self {
        self.minimizer = minimizer;
        self
    }

    pub fn with_bounds(mut self, bounds: BoundsSpec) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_init_to_data(mut self, init_to_data: bool) -> Self {
        self.init_to_data = init_to_data;
        self
    }

    /// Sample the model `m` times per observation interval.
    ///
    /// # Errors
    /// [`AnnealError::InvalidSubsteps`] for `m == 0`.
    pub fn with_model_substeps(mut self, m: usize) -> AnnealResult<Self> {
        if m == 0 {
            return Err(AnnealError::InvalidSubsteps { value: m });
        }
        self.model_substeps = m;
        Ok(self)
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_non_convergence_policy(mut self, policy: NonConvergencePolicy) -> Self {
        self.on_non_convergence = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ladder() -> BetaLadder {
        BetaLadder::integers(3).expect("valid ladder")
    }

    #[test]
    fn alpha_must_exceed_one() {
        assert!(matches!(
            AnnealOptions::new(1.0, 1.0, 1.0, ladder()),
            Err(AnnealError::InvalidAlpha { .. })
        ));
        assert!(AnnealOptions::new(4.0, 4e-6, 2.0, ladder()).is_ok());
    }

    #[test]
    fn precisions_must_be_positive() {
        assert!(matches!(
            AnnealOptions::new(0.0, 1.0, 2.0, ladder()),
            Err(AnnealError::InvalidPrecision { what: "measurement", .. })
        ));
        assert!(matches!(
            AnnealOptions::new(1.0, array![1.0, -1.0], 2.0, ladder()),
            Err(AnnealError::InvalidPrecision { what: "model", index: 1, .. })
        ));
    }

    #[test]
    fn precision_resolves_to_requested_length() {
        assert_eq!(Precision::Scalar(4.0).resolve("rm", 3).expect("scalar"), array![4.0, 4.0, 4.0]);
        assert!(Precision::PerComponent(array![1.0, 2.0]).resolve("rm", 3).is_err());
        assert_eq!(Precision::Scalar(4.0).resolve("rm", 0).expect("empty").len(), 0);
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!("MEAN".parse::<Normalization>(), Ok(Normalization::Mean));
        assert_eq!("abort".parse::<NonConvergencePolicy>(), Ok(NonConvergencePolicy::Abort));
        assert!("median".parse::<Normalization>().is_err());
    }

    #[test]
    fn zero_substeps_are_rejected() {
        let opts = AnnealOptions::new(1.0, 1.0, 2.0, ladder()).expect("valid options");
        assert_eq!(opts.clone().with_model_substeps(0), Err(AnnealError::InvalidSubsteps { value: 0 }));
        assert_eq!(opts.with_model_substeps(2).expect("m = 2").model_substeps, 2);
    }
}
