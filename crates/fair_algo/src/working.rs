//! Private working copy of one allocation call.
//!
//! Built once from the caller's `StoreSet` (never mutated), it holds:
//! - per-store member indices into the competitor table plus live amounts
//! - the competitor table (`CompetitorInfo`) from the Totals Calculator
//! - a cleared copy of the input shape, used for snapshots
//!
//! Stores keep their input order; members keep their in-store order.

use std::collections::BTreeMap;

use fair_core::rounding::variance_percent;
use fair_core::determinism::group_positions_by;
use fair_core::{AllocatedStore, Allocation, StoreName, StoreSet};

use crate::totals::{compute_totals, CompetitorInfo, Totals};

#[derive(Clone, Debug, PartialEq)]
pub struct WorkStore {
    pub name: StoreName,
    pub quantity: u64,
    /// Indices into `WorkingSet::competitors`, in store order.
    pub members: Vec<usize>,
    /// Amounts aligned with `members`.
    pub amounts: Vec<u64>,
    /// False until an allocator has written this store.
    pub allocated: bool,
}

impl WorkStore {
    pub fn sum(&self) -> u64 {
        self.amounts.iter().sum()
    }

    /// Slot position of competitor `ix` inside this store.
    pub fn slot_of(&self, ix: usize) -> Option<usize> {
        self.members.iter().position(|&m| m == ix)
    }
}

#[derive(Clone, Debug)]
pub struct WorkingSet {
    pub stores: Vec<WorkStore>,
    pub competitors: Vec<CompetitorInfo>,
    pub total_products: u64,
    pub total_slots: u64,
    shape: StoreSet,
}

impl WorkingSet {
    pub fn new(input: &StoreSet) -> Self {
        let Totals { total_products, total_slots, competitors } = compute_totals(input);

        let stores = {
            let index: BTreeMap<&str, usize> =
                competitors.iter().enumerate().map(|(i, c)| (c.name.as_str(), i)).collect();
            input
                .iter()
                .map(|s| {
                    let members: Vec<usize> =
                        s.competitors().filter_map(|c| index.get(c.as_str()).copied()).collect();
                    WorkStore {
                        name: s.name.clone(),
                        quantity: s.quantity,
                        amounts: vec![0; members.len()],
                        members,
                        allocated: false,
                    }
                })
                .collect()
        };

        Self { stores, competitors, total_products, total_slots, shape: input.cleared() }
    }

    pub fn ideal_per_slot(&self) -> f64 {
        if self.total_slots == 0 {
            0.0
        } else {
            self.total_products as f64 / self.total_slots as f64
        }
    }

    /// Rebuild every `current_total` (and `deficit`) from allocated stores.
    pub fn refresh_current_totals(&mut self) {
        for c in &mut self.competitors {
            c.current_total = 0;
        }
        for store in self.stores.iter().filter(|s| s.allocated) {
            for (&ix, &amount) in store.members.iter().zip(&store.amounts) {
                self.competitors[ix].current_total += amount;
            }
        }
        for c in &mut self.competitors {
            c.deficit = c.ideal_total - c.current_total as f64;
        }
    }

    /// Appearance-count groups (ascending key), members in first-appearance order.
    pub fn appearance_groups(&self) -> BTreeMap<u32, Vec<usize>> {
        group_positions_by(self.competitors.iter().map(|c| c.appearances))
    }

    /// Largest group variance percent over groups with ≥ 2 members,
    /// measured on the current running totals.
    pub fn max_group_variance(&self) -> f64 {
        self.appearance_groups()
            .values()
            .filter(|g| g.len() >= 2)
            .map(|g| {
                let totals: Vec<u64> = g.iter().map(|&i| self.competitors[i].current_total).collect();
                variance_percent(&totals)
            })
            .fold(0.0, f64::max)
    }

    /// Input-shaped view; stores not yet allocated keep every amount unset.
    pub fn snapshot(&self) -> StoreSet {
        let mut out = self.shape.clone();
        for (view, work) in out.iter_mut().zip(&self.stores) {
            if !work.allocated {
                continue;
            }
            for (&ix, &amount) in work.members.iter().zip(&work.amounts) {
                view.set_amount(self.competitors[ix].name.as_str(), Some(amount));
            }
        }
        out
    }

    pub fn into_allocation(self) -> Allocation {
        let competitors = self.competitors;
        let stores = self
            .stores
            .into_iter()
            .map(|s| AllocatedStore {
                amounts: s
                    .members
                    .iter()
                    .zip(&s.amounts)
                    .map(|(&ix, &a)| (competitors[ix].name.clone(), a))
                    .collect(),
                name: s.name,
                quantity: s.quantity,
            })
            .collect();
        Allocation::from_stores(stores)
    }
}
