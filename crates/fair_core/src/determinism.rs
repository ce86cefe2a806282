//! Determinism utilities: stable ordering & grouping.
//!
//! Every result of the engine depends on insertion order (stores, and
//! competitors within a store). The helpers here never consult a hash order:
//! - grouping keys are kept in a `BTreeMap` (ascending key order)
//! - members inside a group keep their first-seen order
//! - "largest first" orderings are stable, so equal amounts keep input order

use core::cmp::Ordering;
use std::collections::BTreeMap;

/* -------------------------------------------------------------------------- */
/*                                  Grouping                                  */
/* -------------------------------------------------------------------------- */

/// Group positions `0..n` by a key, ascending by key; members keep input order.
///
/// ```
/// use fair_core::determinism::group_positions_by;
/// let g = group_positions_by([3u32, 1, 3, 2].into_iter());
/// assert_eq!(g[&3], vec![0, 2]);
/// assert_eq!(g.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
/// ```
pub fn group_positions_by<K, I>(keys: I) -> BTreeMap<K, Vec<usize>>
where
    K: Ord,
    I: Iterator<Item = K>,
{
    let mut groups: BTreeMap<K, Vec<usize>> = BTreeMap::new();
    for (pos, key) in keys.enumerate() {
        groups.entry(key).or_default().push(pos);
    }
    groups
}

/* -------------------------------------------------------------------------- */
/*                              Stable orderings                              */
/* -------------------------------------------------------------------------- */

/// Positions of `amounts` ordered by amount descending; ties keep input order.
pub fn positions_by_amount_desc(amounts: &[u64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..amounts.len()).collect();
    order.sort_by(|&a, &b| cmp_desc(amounts[a], amounts[b]));
    order
}

/// Position of the first largest amount (earliest wins on ties).
pub fn first_max_position(amounts: &[u64]) -> Option<usize> {
    positions_by_amount_desc(amounts).into_iter().next()
}

#[inline]
fn cmp_desc(a: u64, b: u64) -> Ordering {
    b.cmp(&a)
}

/* ---------------------------------- Tests --------------------------------- */
