//! Proportional Allocator (deficit-driven split).
//!
//! Contract:
//! - `ideal_per_slot = total_products / total_slots`; each competitor's
//!   `ideal_total = ideal_per_slot × appearances`, initial `deficit = ideal_total`.
//! - Stores are processed in input order. Inside a store every slot but the
//!   last gets `round(q × deficit / Σdeficits)` (or an even share of what is
//!   left once no deficit is positive); the last slot takes `q − given`.
//!   Each amount is clamped up to the minimum as it is produced.
//! - Local exact-sum repair runs before the store's amounts feed back into
//!   the running totals, so later stores see up-to-date deficits.

use fair_core::rounding::round_half_away;
use tracing::debug;

use crate::repair::settle_local;
use crate::totals::CompetitorInfo;
use crate::working::WorkingSet;

/// Set ideals and reset running figures. Returns `ideal_per_slot`.
pub fn prepare_ideals(ws: &mut WorkingSet) -> f64 {
    let ideal_per_slot = ws.ideal_per_slot();
    for c in &mut ws.competitors {
        c.ideal_total = ideal_per_slot * c.appearances as f64;
        c.current_total = 0;
        c.deficit = c.ideal_total;
    }
    ideal_per_slot
}

/// Split one store's quantity among its members and record it.
pub fn allocate_store(ws: &mut WorkingSet, store_ix: usize, minimum: u64) {
    let store = &ws.stores[store_ix];
    let amounts = split_by_deficit(store.quantity, &store.members, &ws.competitors, minimum);

    let store = &mut ws.stores[store_ix];
    store.amounts = amounts;
    store.allocated = true;
    for (&ix, &amount) in store.members.iter().zip(&store.amounts) {
        ws.competitors[ix].receive(amount);
    }
    debug!(store = %store.name, quantity = store.quantity, amounts = ?store.amounts, "store allocated");
}

/// Run `allocate_store` over every store in order.
pub fn allocate_proportional(ws: &mut WorkingSet, minimum: u64) {
    for ix in 0..ws.stores.len() {
        allocate_store(ws, ix, minimum);
    }
}

fn split_by_deficit(quantity: u64, members: &[usize], infos: &[CompetitorInfo], minimum: u64) -> Vec<u64> {
    let n = members.len();
    let mut amounts = vec![0u64; n];
    if n == 0 {
        return amounts;
    }

    let sum_deficits: f64 = members.iter().map(|&ix| infos[ix].deficit).sum();
    let q = quantity as i64;
    let mut given: i64 = 0;

    for (k, &ix) in members.iter().enumerate() {
        let raw = if k == n - 1 {
            q - given
        } else if sum_deficits > 0.0 {
            round_half_away(quantity as f64 * infos[ix].deficit / sum_deficits)
        } else {
            round_half_away((q - given) as f64 / (n - k) as f64)
        };
        let amount = clamp_to_minimum(raw, minimum);
        amounts[k] = amount;
        given += amount as i64;
    }

    settle_local(&mut amounts, quantity, minimum);
    amounts
}

#[inline]
fn clamp_to_minimum(raw: i64, minimum: u64) -> u64 {
    if raw <= minimum as i64 {
        minimum
    } else {
        raw as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::store_set;

    fn run(set: &fair_core::StoreSet, minimum: u64) -> WorkingSet {
        let mut ws = WorkingSet::new(set);
        prepare_ideals(&mut ws);
        allocate_proportional(&mut ws, minimum);
        ws
    }

    #[test]
    fn two_competitors_split_evenly() {
        let ws = run(&store_set(&[("S", 100, &["A", "B"])]), 20);
        assert_eq!(ws.stores[0].amounts, vec![50, 50]);
    }

    #[test]
    fn single_competitor_takes_everything() {
        let ws = run(&store_set(&[("S1", 100, &["A"]), ("S2", 150, &["B"])]), 0);
        assert_eq!(ws.stores[0].amounts, vec![100]);
        assert_eq!(ws.stores[1].amounts, vec![150]);
    }

    #[test]
    fn later_stores_see_earlier_allocations() {
        // ideal_per_slot = 250 / 5 = 50; A, B ideal 100; C ideal 50
        let ws = run(&store_set(&[("L1", 100, &["A", "B"]), ("L2", 150, &["A", "B", "C"])]), 10);
        assert_eq!(ws.stores[0].amounts, vec![50, 50]);
        assert_eq!(ws.stores[1].amounts, vec![50, 50, 50]);
        assert!(ws.competitors.iter().all(|c| c.deficit.abs() < 1e-9));
    }

    #[test]
    fn minimum_clamp_is_repaired_locally() {
        // C already holds more than its ideal: A and B get 7 each, C's
        // remainder (-4) is clamped to 3, and the 7 excess is shed from A then B.
        let mut ws = WorkingSet::new(&store_set(&[("S1", 10, &["A", "B", "C"])]));
        prepare_ideals(&mut ws);
        ws.competitors[2].receive(5);
        allocate_store(&mut ws, 0, 3);
        assert_eq!(ws.stores[0].amounts, vec![3, 4, 3]);
        assert_eq!(ws.stores[0].sum(), 10);
    }

    #[test]
    fn clamp_handles_negative_raw() {
        assert_eq!(clamp_to_minimum(-7, 5), 5);
        assert_eq!(clamp_to_minimum(9, 5), 9);
        assert_eq!(clamp_to_minimum(0, 0), 0);
    }
}
