//! Index sets: which state components are measured (`Lidx`) and which
//! parameter slots are estimated (`Pidx`).
use crate::annealing::errors::{AnnealError, AnnealResult};

fn validate_indices(what: &'static str, indices: &[usize], len: usize) -> AnnealResult<()> {
    let mut seen = vec![false; len];
    for &index in indices {
        if index >= len {
            return Err(AnnealError::IndexOutOfRange { what, index, len });
        }
        if seen[index] {
            return Err(AnnealError::DuplicateIndex { what, index });
        }
        seen[index] = true;
    }
    Ok(())
}

/// Observed state components, in the column order of the observations.
///
/// Invariant: entries are distinct and `< D`, hence `|Lidx| ≤ D`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementMap {
    indices: Vec<usize>,
}

impl MeasurementMap {
    pub fn new(indices: &[usize], dim: usize) -> AnnealResult<Self> {
        validate_indices("measured", indices, dim)?;
        Ok(Self { indices: indices.to_vec() })
    }

    /// Observation column `i` measures state component `indices()[i]`.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Estimated parameter slots; every other slot keeps its initial value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamIndex {
    indices: Vec<usize>,
    free: Vec<bool>,
}

impl ParamIndex {
    pub fn new(indices: &[usize], n_params: usize) -> AnnealResult<Self> {
        validate_indices("estimated parameter", indices, n_params)?;
        let mut free = vec![false; n_params];
        for &j in indices {
            free[j] = true;
        }
        Ok(Self { indices: indices.to_vec(), free })
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn is_free(&self, j: usize) -> bool {
        self.free.get(j).copied().unwrap_or(false)
    }

    pub fn n_params(&self) -> usize {
        self.free.len()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measurement_map_rejects_out_of_range_and_duplicates() {
        assert!(MeasurementMap::new(&[0, 2, 4], 5).is_ok());
        assert!(MeasurementMap::new(&[], 3).expect("empty is allowed").is_empty());
        assert_eq!(
            MeasurementMap::new(&[0, 5], 5),
            Err(AnnealError::IndexOutOfRange { what: "measured", index: 5, len: 5 })
        );
        assert_eq!(
            MeasurementMap::new(&[1, 1], 5),
            Err(AnnealError::DuplicateIndex { what: "measured", index: 1 })
        );
    }

    #[test]
    fn param_index_tracks_free_slots() {
        let pidx = ParamIndex::new(&[2, 0], 3).expect("valid");
        assert!(pidx.is_free(0));
        assert!(!pidx.is_free(1));
        assert!(pidx.is_free(2));
        assert!(!pidx.is_free(7));
        assert_eq!(pidx.len(), 2);
    }
}
