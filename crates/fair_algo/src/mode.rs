//! Mode selection between the proportional path and the adaptive fallback.

use core::fmt;

use crate::totals::Totals;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Exclusive-competitor share (percent) at or above which the adaptive
/// strategy replaces the proportional path.
pub const ADAPTIVE_EXCLUSIVE_PCT: f64 = 80.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Strategy {
    /// Deficit-driven split with cross-store balancing.
    Proportional,
    /// Even split inside each store.
    Adaptive,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Proportional => "proportional",
            Strategy::Adaptive => "adaptive",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn select_strategy(totals: &Totals) -> Strategy {
    if totals.exclusive_ratio_pct() >= ADAPTIVE_EXCLUSIVE_PCT {
        Strategy::Adaptive
    } else {
        Strategy::Proportional
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::store_set;
    use crate::totals::compute_totals;

    #[test]
    fn exactly_eighty_percent_is_adaptive() {
        // A shared; B, C, D, E exclusive → 4/5 = 80%
        let set = store_set(&[("S1", 10, &["A", "B", "C"]), ("S2", 10, &["A", "D", "E"])]);
        assert_eq!(select_strategy(&compute_totals(&set)), Strategy::Adaptive);
    }

    #[test]
    fn shared_majority_is_proportional() {
        let set = store_set(&[("S1", 10, &["A", "B"]), ("S2", 10, &["A", "B", "C"])]);
        assert_eq!(select_strategy(&compute_totals(&set)), Strategy::Proportional);
        assert_eq!(Strategy::Proportional.to_string(), "proportional");
    }

    #[test]
    fn empty_input_is_proportional() {
        assert_eq!(select_strategy(&compute_totals(&Default::default())), Strategy::Proportional);
    }
}
