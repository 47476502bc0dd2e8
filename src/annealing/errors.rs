//! Error surface for the annealing engine.
//!
//! Variants fall into four families:
//! - configuration errors (shapes, index sets, bounds, precisions, ladder,
//!   names, timestamps), reported at setup and always fatal;
//! - [`AnnealError::NumericalDivergence`], a non-finite action or gradient
//!   during a rung, fatal for the run;
//! - [`AnnealError::RungNotConverged`], raised only when the non-convergence
//!   policy is `Abort`;
//! - persistence errors ([`AnnealError::Io`], [`AnnealError::Serialization`])
//!   carrying the offending path.
use crate::optimization::errors::OptError;

/// Result alias for annealing operations.
pub type AnnealResult<T> = Result<T, AnnealError>;

#[derive(Debug, Clone, PartialEq)]
pub enum AnnealError {
    // ---- Shapes ----
    /// Model state dimension must be at least 1.
    InvalidDimension {
        dim: usize,
    },
    /// An array did not have the shape its role requires.
    ShapeMismatch {
        what: &'static str,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    /// Input arrays must be finite.
    NonFiniteInput {
        what: &'static str,
        index: Vec<usize>,
        value: f64,
    },

    // ---- Index sets ----
    /// Measured or estimated index outside its range.
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    /// Index sets must not repeat entries.
    DuplicateIndex {
        what: &'static str,
        index: usize,
    },

    // ---- Observations ----
    /// At least two time points are needed to define `dt`.
    TooFewTimePoints {
        found: usize,
    },
    /// Timestamps must be strictly increasing with constant spacing.
    NonUniformTimestamps {
        index: usize,
        expected_dt: f64,
        found_dt: f64,
    },

    // ---- Options ----
    /// Bounds with `low > high`, NaN, or no finite value.
    InvalidBounds {
        what: &'static str,
        index: usize,
        low: f64,
        high: f64,
    },
    /// Precision weights must be finite and strictly positive.
    InvalidPrecision {
        what: &'static str,
        index: usize,
        value: f64,
    },
    /// The continuation base must be finite and greater than one.
    InvalidAlpha {
        value: f64,
    },
    /// Ladder must be non-empty, finite, non-negative, strictly increasing.
    InvalidLadder {
        index: usize,
        value: f64,
        reason: &'static str,
    },
    /// Unknown discretization, normalization or policy name.
    UnknownName {
        what: &'static str,
        name: String,
    },
    /// Model sampling multiplier must be at least one.
    InvalidSubsteps {
        value: usize,
    },
    /// Minimizer configuration rejected.
    InvalidMinimizerOptions {
        source: OptError,
    },

    // ---- Runtime ----
    /// Non-finite action or gradient during a rung.
    NumericalDivergence {
        rung: usize,
        beta: f64,
        detail: String,
    },
    /// Rung ended without meeting its tolerance under the `Abort` policy.
    RungNotConverged {
        rung: usize,
        beta: f64,
        status: String,
    },
    /// Minimizer failed for a reason other than divergence.
    OptimizationFailed {
        rung: usize,
        beta: f64,
        source: OptError,
    },
    /// Results requested before any rung completed.
    NotAnnealed,

    // ---- Persistence ----
    Io {
        path: String,
        reason: String,
    },
    Serialization {
        path: String,
        reason: String,
    },
}

impl AnnealError {
    /// Whether the error stems from invalid setup rather than a run.
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            AnnealError::NumericalDivergence { .. }
                | AnnealError::RungNotConverged { .. }
                | AnnealError::OptimizationFailed { .. }
                | AnnealError::NotAnnealed
                | AnnealError::Io { .. }
                | AnnealError::Serialization { .. }
        )
    }

    /// Attach rung context to a minimizer error.
    ///
    /// Non-finite cost/gradient failures become `NumericalDivergence`;
    /// anything else becomes `OptimizationFailed`.
    pub fn from_rung(rung: usize, beta: f64, err: OptError) -> Self {
        if err.is_non_finite() {
            AnnealError::NumericalDivergence { rung, beta, detail: err.to_string() }
        } else {
            AnnealError::OptimizationFailed { rung, beta, source: err }
        }
    }
}

impl std::error::Error for AnnealError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnnealError::InvalidMinimizerOptions { source }
            | AnnealError::OptimizationFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnnealError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Shapes ----
            AnnealError::InvalidDimension { dim } => {
                write!(f, "Invalid model dimension {dim}: must be at least 1")
            }
            AnnealError::ShapeMismatch { what, expected, found } => {
                write!(f, "Shape mismatch for {what}: expected {expected:?}, found {found:?}")
            }
            AnnealError::NonFiniteInput { what, index, value } => {
                write!(f, "Non-finite {what} at {index:?}: {value}")
            }

            // ---- Index sets ----
            AnnealError::IndexOutOfRange { what, index, len } => {
                write!(f, "{what} index {index} out of range for length {len}")
            }
            AnnealError::DuplicateIndex { what, index } => {
                write!(f, "Duplicate {what} index {index}")
            }

            // ---- Observations ----
            AnnealError::TooFewTimePoints { found } => {
                write!(f, "At least two time points are required, found {found}")
            }
            AnnealError::NonUniformTimestamps { index, expected_dt, found_dt } => {
                write!(
                    f,
                    "Non-uniform timestamps at row {index}: expected spacing {expected_dt}, found {found_dt}"
                )
            }

            // ---- Options ----
            AnnealError::InvalidBounds { what, index, low, high } => {
                write!(f, "Invalid {what} bounds at index {index}: [{low}, {high}]")
            }
            AnnealError::InvalidPrecision { what, index, value } => {
                write!(f, "Invalid {what} precision at index {index}: {value}, must be finite and > 0")
            }
            AnnealError::InvalidAlpha { value } => {
                write!(f, "Invalid alpha {value}: must be finite and > 1")
            }
            AnnealError::InvalidLadder { index, value, reason } => {
                write!(f, "Invalid beta ladder at rung {index} ({value}): {reason}")
            }
            AnnealError::UnknownName { what, name } => {
                write!(f, "Unknown {what} '{name}'")
            }
            AnnealError::InvalidSubsteps { value } => {
                write!(f, "Invalid model substeps {value}: must be at least 1")
            }
            AnnealError::InvalidMinimizerOptions { source } => {
                write!(f, "Invalid minimizer options: {source}")
            }

            // ---- Runtime ----
            AnnealError::NumericalDivergence { rung, beta, detail } => {
                write!(f, "Numerical divergence at rung {rung} (beta = {beta}): {detail}")
            }
            AnnealError::RungNotConverged { rung, beta, status } => {
                write!(f, "Rung {rung} (beta = {beta}) did not converge: {status}")
            }
            AnnealError::OptimizationFailed { rung, beta, source } => {
                write!(f, "Optimization failed at rung {rung} (beta = {beta}): {source}")
            }
            AnnealError::NotAnnealed => {
                write!(f, "No annealing results available")
            }

            // ---- Persistence ----
            AnnealError::Io { path, reason } => {
                write!(f, "I/O error on '{path}': {reason}")
            }
            AnnealError::Serialization { path, reason } => {
                write!(f, "Serialization error on '{path}': {reason}")
            }
        }
    }
}

impl From<OptError> for AnnealError {
    fn from(err: OptError) -> Self {
        AnnealError::InvalidMinimizerOptions { source: err }
    }
}
