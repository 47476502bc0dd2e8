//! Best-point tracking observer.
//!
//! Argmin keeps its best iterate inside the executor state, which is lost when
//! `run()` returns an error (for example a line search that cannot satisfy its
//! conditions). [`BestPointTracker`] records the best `(param, cost, iter)`
//! seen by the observer hooks into shared storage so the runner can still
//! report a usable point in that case.
use crate::optimization::minimizer::types::{Cost, Grad, Theta};
use argmin::core::{Error, IterState, KV, State, observers::Observe};
use std::sync::{Arc, Mutex};

/// Snapshot of the best solver iterate seen so far (solver coordinates).
#[derive(Debug, Clone, PartialEq)]
pub struct BestPoint {
    pub param: Theta,
    pub cost: Cost,
    pub iter: u64,
}

/// Observer sharing its best point through an `Arc<Mutex<_>>`.
#[derive(Debug, Clone, Default)]
pub struct BestPointTracker {
    best: Arc<Mutex<Option<BestPoint>>>,
}

impl BestPointTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current best point, if any finite-cost iterate was observed.
    pub fn best(&self) -> Option<BestPoint> {
        self.best.lock().ok().and_then(|guard| guard.clone())
    }

    fn record(&self, state: &IterState<Theta, Grad, (), (), (), f64>) {
        let cost = state.get_best_cost();
        let Some(param) = state.get_best_param() else {
            return;
        };
        if !cost.is_finite() {
            return;
        }
        if let Ok(mut slot) = self.best.lock() {
            let better = slot.as_ref().map_or(true, |b| cost < b.cost);
            if better {
                *slot = Some(BestPoint { param: param.clone(), cost, iter: state.get_iter() });
            }
        }
    }
}

impl Observe<IterState<Theta, Grad, (), (), (), f64>> for BestPointTracker {
    fn observe_init(
        &mut self, _name: &str, state: &IterState<Theta, Grad, (), (), (), f64>, _kv: &KV,
    ) -> Result<(), Error> {
        self.record(state);
        Ok(())
    }

    fn observe_iter(
        &mut self, state: &IterState<Theta, Grad, (), (), (), f64>, _kv: &KV,
    ) -> Result<(), Error> {
        self.record(state);
        Ok(())
    }
}
