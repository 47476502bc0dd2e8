//! Per-rung results and their persistence.
//!
//! Purpose
//! -------
//! Keep every [`RungResult`] in ladder order and expose the history views
//! used to judge an estimate: stacked paths, parameter sets, the
//! `(β, action, measurement error, model error)` table and the list of rungs
//! that stopped short of their tolerance.
//!
//! Key behaviors
//! -------------
//! - Histories are returned as owned `ndarray` values: paths as `[K, N, D]`,
//!   action errors as `[K, 4]`.
//! - Persistence writes one file per array family (or the whole store) with
//!   `bincode` over `serde`, so shapes and values reload bit-for-bit.
//!
//! Conventions
//! -----------
//! - I/O failures carry the offending path as text; encoding failures are
//!   reported separately as `Serialization`.
use crate::annealing::{
    core::params::ParameterSet,
    errors::{AnnealError, AnnealResult},
};
use ndarray::{Array1, Array2, Array3, Axis};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Outcome of one rung, immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RungResult {
    /// Position in the ladder.
    pub index: usize,
    pub beta: f64,
    /// Effective model precision `RF0 ∘ α^β`.
    pub rf: Array1<f64>,
    /// Optimized `[N_model, D]` path.
    pub path: Array2<f64>,
    pub params: ParameterSet,
    pub action: f64,
    pub measurement_error: f64,
    pub model_error: f64,
    /// Whether the minimizer met its tolerance.
    pub converged: bool,
    /// Minimizer termination status.
    pub status: String,
    pub iterations: usize,
}

/// Ordered collection of rung results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultStore {
    rungs: Vec<RungResult>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next rung.
    pub fn push(&mut self, result: RungResult) {
        self.rungs.push(result);
    }

    pub fn rungs(&self) -> &[RungResult] {
        &self.rungs
    }

    pub fn len(&self) -> usize {
        self.rungs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rungs.is_empty()
    }

    /// The last recorded rung, i.e. the final estimate.
    ///
    /// # Errors
    /// [`AnnealError::NotAnnealed`] for an empty store.
    pub fn last(&self) -> AnnealResult<&RungResult> {
        self.rungs.last().ok_or(AnnealError::NotAnnealed)
    }

    pub fn final_path(&self) -> AnnealResult<&Array2<f64>> {
        Ok(&self.last()?.path)
    }

    pub fn final_params(&self) -> AnnealResult<&ParameterSet> {
        Ok(&self.last()?.params)
    }

    /// `[K, N, D]` stack of every rung's path.
    ///
    /// # Errors
    /// [`AnnealError::NotAnnealed`] for an empty store.
    pub fn paths(&self) -> AnnealResult<Array3<f64>> {
        let (n, d) = self.last()?.path.dim();
        let mut out = Array3::zeros((self.rungs.len(), n, d));
        for (mut slab, r) in out.axis_iter_mut(Axis(0)).zip(self.rungs.iter()) {
            if r.path.dim() != (n, d) {
                return Err(AnnealError::ShapeMismatch {
                    what: "path history",
                    expected: vec![n, d],
                    found: r.path.shape().to_vec(),
                });
            }
            slab.assign(&r.path);
        }
        Ok(out)
    }

    /// Every rung's parameter set, in ladder order.
    pub fn params(&self) -> Vec<ParameterSet> {
        self.rungs.iter().map(|r| r.params.clone()).collect()
    }

    /// `[K, 4]` table with rows `(β, action, measurement error, model error)`.
    pub fn action_errors(&self) -> Array2<f64> {
        let mut table = Array2::zeros((self.rungs.len(), 4));
        for (mut row, r) in table.rows_mut().into_iter().zip(self.rungs.iter()) {
            row[0] = r.beta;
            row[1] = r.action;
            row[2] = r.measurement_error;
            row[3] = r.model_error;
        }
        table
    }

    /// Ladder indices of rungs whose minimizer did not converge.
    pub fn non_converged_rungs(&self) -> Vec<usize> {
        self.rungs.iter().filter(|r| !r.converged).map(|r| r.index).collect()
    }

    pub fn all_converged(&self) -> bool {
        self.rungs.iter().all(|r| r.converged)
    }

    /// Write the `[K, N, D]` path history.
    pub fn save_paths<P: AsRef<Path>>(&self, path: P) -> AnnealResult<()> {
        write_bincode(path.as_ref(), &self.paths()?)
    }

    /// Write every rung's parameter set.
    pub fn save_params<P: AsRef<Path>>(&self, path: P) -> AnnealResult<()> {
        write_bincode(path.as_ref(), &self.params())
    }

    /// Write the `[K, 4]` action-error table.
    pub fn save_action_errors<P: AsRef<Path>>(&self, path: P) -> AnnealResult<()> {
        write_bincode(path.as_ref(), &self.action_errors())
    }

    /// Write the whole store, including convergence diagnostics.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> AnnealResult<()> {
        write_bincode(path.as_ref(), self)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> AnnealResult<Self> {
        read_bincode(path.as_ref())
    }
}

pub fn load_paths<P: AsRef<Path>>(path: P) -> AnnealResult<Array3<f64>> {
    read_bincode(path.as_ref())
}

pub fn load_params<P: AsRef<Path>>(path: P) -> AnnealResult<Vec<ParameterSet>> {
    read_bincode(path.as_ref())
}

pub fn load_action_errors<P: AsRef<Path>>(path: P) -> AnnealResult<Array2<f64>> {
    read_bincode(path.as_ref())
}

fn io_error(path: &Path, err: std::io::Error) -> AnnealError {
    AnnealError::Io { path: path.display().to_string(), reason: err.to_string() }
}

fn write_bincode<T: Serialize + ?Sized>(path: &Path, value: &T) -> AnnealResult<()> {
    let file = File::create(path).map_err(|e| io_error(path, e))?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, value).map_err(|e| AnnealError::Serialization {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    writer.flush().map_err(|e| io_error(path, e))?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

fn read_bincode<T: DeserializeOwned>(path: &Path) -> AnnealResult<T> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    bincode::deserialize_from(BufReader::new(file)).map_err(|e| AnnealError::Serialization {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
