//! Exact-Sum Repair.
//!
//! Minimum clamping can push a store's sum away from its quantity. Repair
//! closes the gap without ever taking a slot below the minimum:
//! - surplus (sum < quantity): add the difference to one slot
//!   (`settle_local` → the last slot; `settle_to_max` → the first largest)
//! - excess (sum > quantity): `shed_excess`, largest holders first
//!
//! When `minimum × slots > quantity` the excess cannot be fully shed; the
//! residual is returned and the validator reports the store.

use fair_core::determinism::{first_max_position, positions_by_amount_desc};
use tracing::debug;

use crate::working::WorkingSet;

/// Remove up to `excess` units, walking slots by amount descending (ties in
/// slot order), each down to at most `minimum`. Returns the units left over.
pub fn shed_excess(amounts: &mut [u64], excess: u64, minimum: u64) -> u64 {
    let mut remaining = excess;
    for pos in positions_by_amount_desc(amounts) {
        if remaining == 0 {
            break;
        }
        let room = amounts[pos].saturating_sub(minimum);
        let take = room.min(remaining);
        amounts[pos] -= take;
        remaining -= take;
    }
    remaining
}

/// Per-store fine adjustment used right after the proportional split.
pub fn settle_local(amounts: &mut [u64], quantity: u64, minimum: u64) -> u64 {
    let last = amounts.len().checked_sub(1);
    settle(amounts, quantity, minimum, last)
}

/// Repair variant used by the adaptive split and the global pass.
pub fn settle_to_max(amounts: &mut [u64], quantity: u64, minimum: u64) -> u64 {
    let target = first_max_position(amounts);
    settle(amounts, quantity, minimum, target)
}

fn settle(amounts: &mut [u64], quantity: u64, minimum: u64, surplus_to: Option<usize>) -> u64 {
    let sum: u64 = amounts.iter().sum();
    if sum < quantity {
        match surplus_to {
            Some(pos) => {
                amounts[pos] += quantity - sum;
                0
            }
            None => quantity - sum,
        }
    } else if sum > quantity {
        shed_excess(amounts, sum - quantity, minimum)
    } else {
        0
    }
}

/// Global backstop: re-settle every store whose sum drifted from its quantity.
/// Returns the number of stores changed.
pub fn repair_all(ws: &mut WorkingSet, minimum: u64) -> usize {
    let mut touched = 0;
    for store in &mut ws.stores {
        let before = store.sum();
        if before == store.quantity {
            continue;
        }
        let residual = settle_to_max(&mut store.amounts, store.quantity, minimum);
        if store.sum() != before {
            touched += 1;
        }
        debug!(store = %store.name, before, after = store.sum(), residual, "global exact-sum repair");
    }
    if touched > 0 {
        ws.refresh_current_totals();
    }
    touched
}
