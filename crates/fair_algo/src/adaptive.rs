//! Adaptive Fallback Allocator.
//!
//! Used when most competitors are store-exclusive. Each store is split on its
//! own: `q / n` each, the first `q % n` slots get one extra unit, every slot
//! is clamped to the minimum, then the sum is settled against the largest
//! holder. No cross-store deficits are consulted.

use tracing::debug;

use crate::repair::settle_to_max;
use crate::working::WorkingSet;

pub fn allocate_even_split(ws: &mut WorkingSet, minimum: u64) {
    for store in &mut ws.stores {
        store.amounts = even_split(store.quantity, store.members.len(), minimum);
        store.allocated = true;
        debug!(store = %store.name, quantity = store.quantity, amounts = ?store.amounts, "store split evenly");
    }
    ws.refresh_current_totals();
}

fn even_split(quantity: u64, n: usize, minimum: u64) -> Vec<u64> {
    if n == 0 {
        return Vec::new();
    }
    let n64 = n as u64;
    let base = quantity / n64;
    let extra = (quantity % n64) as usize;

    let mut amounts: Vec<u64> = (0..n).map(|k| (base + u64::from(k < extra)).max(minimum)).collect();
    settle_to_max(&mut amounts, quantity, minimum);
    amounts
}
