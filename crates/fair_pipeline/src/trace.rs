//! Execution history for `distribute_traced`.
//!
//! Each `Step` carries a full snapshot: the input-shaped store set (stores not
//! yet allocated keep unset amounts), the competitor table at that moment and
//! the largest appearance-group variance. Snapshots are cloned, never shared.

use serde::Serialize;

use fair_algo::{BalanceOutcome, CompetitorInfo, Strategy, Transfer, WorkingSet};
use fair_core::{Allocation, StoreName, StoreSet, ValidationResult};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Initial,
    IdealTotals { ideal_per_slot: f64 },
    StoreAllocated { store: StoreName },
    AdaptiveSplit,
    Balancing { rounds: u32, converged: bool, transfers: Vec<Transfer> },
    FineAdjustment { stores_repaired: usize },
    Final { valid: bool },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Step {
    pub index: usize,
    #[serde(flatten)]
    pub phase: Phase,
    pub description: String,
    pub stores: StoreSet,
    pub competitors: Vec<CompetitorInfo>,
    pub variance_percent: f64,
}

/// Output of `distribute_traced`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DistributionRun {
    pub strategy: Strategy,
    pub allocation: Allocation,
    /// Present on the proportional path only.
    pub balance: Option<BalanceOutcome>,
    pub validation: ValidationResult,
    pub steps: Vec<Step>,
}

/// Sink for pipeline checkpoints. `NoTrace` drops everything.
pub(crate) trait Record {
    fn record(&mut self, ws: &WorkingSet, phase: Phase, description: String);
}

pub(crate) struct NoTrace;

impl Record for NoTrace {
    #[inline]
    fn record(&mut self, _: &WorkingSet, _: Phase, _: String) {}
}

#[derive(Default)]
pub(crate) struct Recorder {
    pub steps: Vec<Step>,
}

impl Record for Recorder {
    fn record(&mut self, ws: &WorkingSet, phase: Phase, description: String) {
        self.steps.push(Step {
            index: self.steps.len(),
            phase,
            description,
            stores: ws.snapshot(),
            competitors: ws.competitors.clone(),
            variance_percent: ws.max_group_variance(),
        });
    }
}
