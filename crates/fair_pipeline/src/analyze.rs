//! Structural Analyzer: advisory warnings about how balanceable the input is.
//!
//! Rules, in emission order:
//! - exclusive share ≥ 80%  → attention, "Adaptive strategy applied"
//! - exclusive share ≥ 50%  → attention, "High share of store-exclusive competitors"
//! - ≥ 2 appearance counts and largest / smallest ≥ 3 → info, "Appearance groups differ widely"
//! - no errors and variance > 80% of the ceiling → info, "Variance near limit"
//!
//! Warnings never change `valid`.

use std::collections::BTreeSet;

use fair_algo::ADAPTIVE_EXCLUSIVE_PCT;
use fair_core::rounding::variance_percent;
use fair_core::{Params, Severity, Statistics, StoreSet, Warning};

const HIGH_EXCLUSIVE_PCT: f64 = 50.0;
const GROUP_RATIO_NOTE: u32 = 3;
const NEAR_LIMIT_FRACTION: f64 = 0.8;

pub fn analyze_structure(stores: &StoreSet, stats: &Statistics, has_errors: bool, params: &Params) -> Vec<Warning> {
    let mut out = Vec::new();
    let variance = stats.variance_percent;

    let total = stats.competitors.len();
    let exclusive = stats.competitors.iter().filter(|c| c.store_count == 1).count();
    let exclusive_pct = if total == 0 { 0.0 } else { exclusive as f64 / total as f64 * 100.0 };

    if total > 0 && exclusive_pct >= ADAPTIVE_EXCLUSIVE_PCT {
        let quantities: Vec<u64> = stores.iter().map(|s| s.quantity).collect();
        let asymmetry = variance_percent(&quantities);
        out.push(Warning {
            severity: Severity::Attention,
            title: "Adaptive strategy applied".into(),
            description: format!(
                "{exclusive} of {total} competitors ({exclusive_pct:.1}%) appear in a single store, so each \
                 store was split evenly among its own competitors. Measured variance: {variance:.2}%."
            ),
            suggestions: vec![
                format!(
                    "Store quantities differ by {asymmetry:.1}% of their mean; exclusive competitors inherit \
                     that spread directly."
                ),
                "Compare competitors within the same store rather than across stores.".into(),
                "Track shared competitors in more stores to enable cross-store balancing.".into(),
            ],
        });
    } else if exclusive_pct >= HIGH_EXCLUSIVE_PCT {
        out.push(Warning {
            severity: Severity::Attention,
            title: "High share of store-exclusive competitors".into(),
            description: format!(
                "{exclusive} of {total} competitors ({exclusive_pct:.1}%) appear in a single store; cross-store \
                 balancing has little room to act."
            ),
            suggestions: vec!["Check whether exclusive competitors are also present in other stores.".into()],
        });
    }

    let counts: BTreeSet<u32> = stats.competitors.iter().map(|c| c.store_count).collect();
    if let (Some(&low), Some(&high)) = (counts.first(), counts.last()) {
        if counts.len() > 1 && high >= GROUP_RATIO_NOTE * low {
            out.push(Warning {
                severity: Severity::Info,
                title: "Appearance groups differ widely".into(),
                description: format!(
                    "Competitors appear in between {low} and {high} stores; totals are compared only within \
                     the same appearance count."
                ),
                suggestions: vec!["Expect competitors present in more stores to hold larger totals.".into()],
            });
        }
    }

    if !has_errors && variance > params.max_variance_percent * NEAR_LIMIT_FRACTION {
        out.push(Warning {
            severity: Severity::Info,
            title: "Variance near limit".into(),
            description: format!(
                "Measured variance {variance:.2}% is above 80% of the {}% limit.",
                params.max_variance_percent
            ),
            suggestions: vec!["Small input changes may push the allocation over the limit.".into()],
        });
    }

    out
}
