//! VALIDATE: independent re-check of a finished allocation.
//!
//! Blocking errors (order: per store, sum first, then slots in store order;
//! variance last):
//! - per-store sum ≠ quantity
//! - unset slot amount
//! - slot amount below the minimum
//! - max appearance-group variance above `max_variance_percent + variance_tolerance_points`
//!
//! Statistics are always produced. Warnings come from `analyze_structure` and
//! never affect `valid`. This function never fails.

use fair_core::determinism::group_positions_by;
use fair_core::rounding::variance_percent;
use fair_core::{CompetitorStat, Params, Statistics, StoreSet, ValidationResult};
use tracing::debug;

use crate::analyze::analyze_structure;

pub fn validate(stores: &StoreSet, params: &Params) -> ValidationResult {
    let minimum = params.minimum_per_competitor;
    let mut errors: Vec<String> = Vec::new();

    for store in stores {
        let actual = store.allocated_sum();
        if actual != store.quantity {
            errors.push(format!("{}: sum ({}) differs from expected ({})", store.name, actual, store.quantity));
        }
        for slot in store.slots() {
            match slot.amount {
                None => errors.push(format!("{} - {}: amount not set", store.name, slot.competitor)),
                Some(a) if a < minimum => errors.push(format!(
                    "{} - {}: amount ({}) below minimum ({})",
                    store.name, slot.competitor, a, minimum
                )),
                Some(_) => {}
            }
        }
    }

    let statistics = statistics(stores);
    if statistics.variance_percent > params.variance_error_threshold() {
        errors.push(format!(
            "variance ({:.2}%) exceeds limit ({}%)",
            statistics.variance_percent, params.max_variance_percent
        ));
    }

    let warnings = analyze_structure(stores, &statistics, !errors.is_empty(), params);
    debug!(errors = errors.len(), warnings = warnings.len(), variance = statistics.variance_percent, "validated");

    ValidationResult { valid: errors.is_empty(), errors, warnings, statistics }
}

/// Totals per competitor, first-appearance order. Unset slots are skipped:
/// they add neither to `total` nor to `store_count`.
pub fn statistics(stores: &StoreSet) -> Statistics {
    let mut competitors: Vec<CompetitorStat> = Vec::new();
    for store in stores {
        for slot in store.slots() {
            let Some(amount) = slot.amount else { continue };
            match competitors.iter_mut().find(|c| c.name == slot.competitor) {
                Some(stat) => {
                    stat.total += amount;
                    stat.store_count += 1;
                }
                None => competitors.push(CompetitorStat {
                    name: slot.competitor.clone(),
                    total: amount,
                    store_count: 1,
                }),
            }
        }
    }

    let total_products = stores.total_quantity();
    let competitor_count = competitors.len();
    let allocated: u64 = competitors.iter().map(|c| c.total).sum();
    let mean_per_competitor = if competitor_count == 0 { 0.0 } else { allocated as f64 / competitor_count as f64 };

    Statistics {
        total_products,
        competitor_count,
        mean_per_competitor,
        variance_percent: max_group_variance(&competitors),
        competitors,
    }
}

/// Largest `(max − min) / mean × 100` over appearance-count groups of ≥ 2.
pub fn max_group_variance(competitors: &[CompetitorStat]) -> f64 {
    group_positions_by(competitors.iter().map(|c| c.store_count))
        .values()
        .filter(|g| g.len() > 1)
        .map(|g| {
            let totals: Vec<u64> = g.iter().map(|&i| competitors[i].total).collect();
            variance_percent(&totals)
        })
        .fold(0.0, f64::max)
}
