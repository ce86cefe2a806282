//! Totals Calculator: one counting pass over the input.
//!
//! - `total_products`: sum of store quantities
//! - `total_slots`: number of (store, competitor) pairings
//! - one `CompetitorInfo` per distinct competitor, in first-appearance order,
//!   with `appearances` filled and the running figures at zero

use std::collections::BTreeMap;

use fair_core::{CompetitorName, StoreSet};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Per-competitor working record; owned by a single allocation call.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CompetitorInfo {
    pub name: CompetitorName,
    /// Number of stores tracking this competitor.
    pub appearances: u32,
    /// `appearances × ideal_per_slot`.
    pub ideal_total: f64,
    /// Units received so far.
    pub current_total: u64,
    /// `ideal_total − current_total`.
    pub deficit: f64,
}

impl CompetitorInfo {
    fn new(name: CompetitorName) -> Self {
        Self { name, appearances: 0, ideal_total: 0.0, current_total: 0, deficit: 0.0 }
    }

    pub fn is_exclusive(&self) -> bool {
        self.appearances == 1
    }

    /// Record `amount` more units and refresh the deficit.
    pub fn receive(&mut self, amount: u64) {
        self.current_total += amount;
        self.deficit = self.ideal_total - self.current_total as f64;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Totals {
    pub total_products: u64,
    pub total_slots: u64,
    pub competitors: Vec<CompetitorInfo>,
}

impl Totals {
    /// Share of competitors appearing in exactly one store, in percent.
    pub fn exclusive_ratio_pct(&self) -> f64 {
        exclusive_ratio_pct(&self.competitors)
    }

    /// `total_products / total_slots`, or `0.0` with no slots.
    pub fn ideal_per_slot(&self) -> f64 {
        if self.total_slots == 0 {
            0.0
        } else {
            self.total_products as f64 / self.total_slots as f64
        }
    }
}

pub fn compute_totals(stores: &StoreSet) -> Totals {
    let mut total_products = 0u64;
    let mut total_slots = 0u64;
    let mut competitors: Vec<CompetitorInfo> = Vec::new();
    let mut index: BTreeMap<&str, usize> = BTreeMap::new();

    for store in stores {
        total_products += store.quantity;
        for name in store.competitors() {
            total_slots += 1;
            let ix = *index.entry(name.as_str()).or_insert_with(|| {
                competitors.push(CompetitorInfo::new(name.clone()));
                competitors.len() - 1
            });
            competitors[ix].appearances += 1;
        }
    }

    Totals { total_products, total_slots, competitors }
}

/// Exclusive share in percent; an empty list has no exclusives (`0.0`).
pub fn exclusive_ratio_pct(infos: &[CompetitorInfo]) -> f64 {
    if infos.is_empty() {
        return 0.0;
    }
    let exclusive = infos.iter().filter(|c| c.is_exclusive()).count();
    exclusive as f64 / infos.len() as f64 * 100.0
}
