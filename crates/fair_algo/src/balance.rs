//! Variance Balancer.
//!
//! Bounded, greedy post-pass over a finished proportional allocation. Each
//! round:
//! 1. running totals are rebuilt from the live amounts,
//! 2. competitors are grouped by appearance count (ascending),
//! 3. every group of ≥ 2 whose spread exceeds the ceiling tries one transfer
//!    per store: largest-total member present → smallest-total member present,
//!    only when the donor is above the group mean and the receiver below it.
//!
//! Amount: `max(1, ⌊min(donor − mean, mean − receiver) / 2⌋)`, capped by the
//! donor's room above the minimum at that store. Transfers stay inside a
//! store, so per-store sums are untouched.
//!
//! Determinism: groups in key order, members in first-appearance order,
//! stores in input order, stable sort for donor/receiver ties.

use fair_core::rounding::{mean, variance_percent};
use fair_core::{CompetitorName, StoreName};
use tracing::{debug, trace};

use crate::working::WorkingSet;

#[cfg(feature = "serde")]
use serde::Serialize;

/// One applied move inside a store.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Transfer {
    pub store: StoreName,
    pub donor: CompetitorName,
    pub receiver: CompetitorName,
    pub amount: u64,
    /// 1-based round in which the move happened.
    pub round: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BalanceOutcome {
    /// Rounds executed, including the final round that moved nothing.
    pub rounds: u32,
    /// True when a round made no transfer before the bound was hit.
    pub converged: bool,
    pub transfers: Vec<Transfer>,
}

/// Run rounds until one moves nothing or `max_rounds` is reached.
pub fn balance_variance(
    ws: &mut WorkingSet,
    max_variance_percent: f64,
    minimum: u64,
    max_rounds: u32,
) -> BalanceOutcome {
    let mut out = BalanceOutcome::default();
    while out.rounds < max_rounds {
        out.rounds += 1;
        if !balance_round(ws, max_variance_percent, minimum, out.rounds, &mut out.transfers) {
            out.converged = true;
            break;
        }
    }
    ws.refresh_current_totals();
    debug!(
        rounds = out.rounds,
        converged = out.converged,
        transfers = out.transfers.len(),
        variance = ws.max_group_variance(),
        "variance balancing done"
    );
    out
}

/// One balancing round. Returns whether anything moved.
pub fn balance_round(
    ws: &mut WorkingSet,
    max_variance_percent: f64,
    minimum: u64,
    round: u32,
    log: &mut Vec<Transfer>,
) -> bool {
    ws.refresh_current_totals();
    let mut moved = false;

    for (appearances, group) in ws.appearance_groups() {
        if group.len() < 2 {
            continue;
        }
        let totals: Vec<u64> = group.iter().map(|&ix| ws.competitors[ix].current_total).collect();
        let variance = variance_percent(&totals);
        if variance <= max_variance_percent {
            continue;
        }
        let group_mean = mean(&totals);
        trace!(round, appearances, variance, group_mean, "group over ceiling");

        for s in 0..ws.stores.len() {
            if let Some(t) = transfer_at_store(ws, s, &group, group_mean, minimum, round) {
                log.push(t);
                moved = true;
            }
        }
    }
    moved
}

fn transfer_at_store(
    ws: &mut WorkingSet,
    store_ix: usize,
    group: &[usize],
    group_mean: f64,
    minimum: u64,
    round: u32,
) -> Option<Transfer> {
    let store = &ws.stores[store_ix];

    // (competitor, slot) for group members present here, group order
    let mut present: Vec<(usize, usize)> =
        group.iter().filter_map(|&ix| store.slot_of(ix).map(|slot| (ix, slot))).collect();
    if present.len() < 2 {
        return None;
    }
    present.sort_by(|a, b| ws.competitors[b.0].current_total.cmp(&ws.competitors[a.0].current_total));

    let (donor, donor_slot) = present[0];
    let (receiver, receiver_slot) = present[present.len() - 1];
    let donor_total = ws.competitors[donor].current_total as f64;
    let receiver_total = ws.competitors[receiver].current_total as f64;
    if !(donor_total > group_mean && receiver_total < group_mean) {
        return None;
    }

    let ideal = (donor_total - group_mean).min(group_mean - receiver_total);
    let wanted = ((ideal / 2.0).floor() as u64).max(1);
    let room = store.amounts[donor_slot].saturating_sub(minimum);
    let amount = wanted.min(room);
    if amount == 0 {
        return None;
    }

    let store = &mut ws.stores[store_ix];
    store.amounts[donor_slot] -= amount;
    store.amounts[receiver_slot] += amount;
    ws.competitors[donor].current_total -= amount;
    ws.competitors[receiver].current_total += amount;

    let t = Transfer {
        store: store.name.clone(),
        donor: ws.competitors[donor].name.clone(),
        receiver: ws.competitors[receiver].name.clone(),
        amount,
        round,
    };
    trace!(store = %t.store, donor = %t.donor, receiver = %t.receiver, amount, round, "transfer");
    Some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::store_set;

    fn allocated(set: &fair_core::StoreSet, amounts: &[&[u64]]) -> WorkingSet {
        let mut ws = WorkingSet::new(set);
        for (store, a) in ws.stores.iter_mut().zip(amounts) {
            store.amounts = a.to_vec();
            store.allocated = true;
        }
        ws.refresh_current_totals();
        ws
    }

    #[test]
    fn moves_from_rich_to_poor_within_group() {
        // A, B both appear twice; totals 140 vs 60, mean 100
        let set = store_set(&[("S1", 100, &["A", "B"]), ("S2", 100, &["A", "B"])]);
        let mut ws = allocated(&set, &[&[70, 30], &[70, 30]]);
        let mut log = Vec::new();
        assert!(balance_round(&mut ws, 10.0, 10, 1, &mut log));
        // S1: min(40, 40) / 2 = 20 → totals 120 / 80; S2: min(20, 20) / 2 = 10
        assert_eq!(ws.stores[0].amounts, vec![50, 50]);
        assert_eq!(ws.stores[1].amounts, vec![60, 40]);
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].amount, 20);
        assert_eq!(log[1].amount, 10);
        assert_eq!(log[0].donor, "A");
        assert_eq!(log[0].receiver, "B");
    }

    #[test]
    fn respects_minimum_at_donor_store() {
        let set = store_set(&[("S1", 30, &["A", "B"]), ("S2", 130, &["A", "B"])]);
        // A: 20 + 110 = 130, B: 10 + 20 = 30, mean 80
        let mut ws = allocated(&set, &[&[20, 10], &[110, 20]]);
        let mut log = Vec::new();
        balance_round(&mut ws, 5.0, 20, 1, &mut log);
        assert_eq!(ws.stores[0].amounts, vec![20, 10]);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].store, "S2");
        assert_eq!(log[0].amount, 25);
    }

    #[test]
    fn groups_by_appearance_count_only() {
        // A twice, B once: singleton groups never transfer
        let set = store_set(&[("S1", 100, &["A", "B"]), ("S2", 100, &["A"])]);
        let mut ws = allocated(&set, &[&[90, 10], &[100]]);
        let out = balance_variance(&mut ws, 0.0, 0, 50);
        assert!(out.converged);
        assert_eq!(out.rounds, 1);
        assert!(out.transfers.is_empty());
    }

    #[test]
    fn converges_and_keeps_sums() {
        let set = store_set(&[("S1", 100, &["A", "B", "C"]), ("S2", 90, &["A", "B", "C"])]);
        let mut ws = allocated(&set, &[&[80, 10, 10], &[10, 70, 10]]);
        let out = balance_variance(&mut ws, 5.0, 10, 1000);
        assert!(out.converged);
        assert_eq!(ws.stores[0].sum(), 100);
        assert_eq!(ws.stores[1].sum(), 90);
        assert!(ws.stores.iter().flat_map(|s| s.amounts.iter()).all(|&a| a >= 10));
        assert!(ws.max_group_variance() <= 5.0);
    }

    #[test]
    fn round_bound_is_honoured() {
        let set = store_set(&[("S1", 100, &["A", "B"]), ("S2", 100, &["A", "B"])]);
        let mut ws = allocated(&set, &[&[90, 10], &[90, 10]]);
        let out = balance_variance(&mut ws, 0.0, 0, 1);
        assert_eq!(out.rounds, 1);
        assert!(!out.converged);
        assert!(!out.transfers.is_empty());
    }
}
