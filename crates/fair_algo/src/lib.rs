// crates/fair_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Allocation passes over a private working copy.
//!
//! Order of use (see `fair_pipeline::distribute`):
//! `WorkingSet::new` → `select_strategy` →
//! { `allocate_even_split` | `prepare_ideals` + `allocate_proportional` + `balance_variance` }
//! → `repair_all`.

pub mod adaptive;
pub mod balance;
pub mod mode;
pub mod proportional;
pub mod repair;
pub mod totals;
pub mod working;

pub use adaptive::allocate_even_split;
pub use balance::{balance_round, balance_variance, BalanceOutcome, Transfer};
pub use mode::{select_strategy, Strategy, ADAPTIVE_EXCLUSIVE_PCT};
pub use proportional::{allocate_proportional, allocate_store, prepare_ideals};
pub use repair::{repair_all, settle_local, settle_to_max, shed_excess};
pub use totals::{compute_totals, exclusive_ratio_pct, CompetitorInfo, Totals};
pub use working::{WorkStore, WorkingSet};
