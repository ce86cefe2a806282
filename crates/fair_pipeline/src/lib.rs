//! fair_pipeline — deterministic engine surface (distribute → validate → analyze).
//! This crate stays I/O-free: inputs arrive as `fair_core` types (see `fair_io`
//! for JSON), allocation passes live in `fair_algo`.

#![forbid(unsafe_code)]

pub mod analyze;
pub mod distribute;
pub mod trace;
pub mod validate;

pub use analyze::analyze_structure;
pub use distribute::{distribute, distribute_traced, DistributeError};
pub use trace::{DistributionRun, Phase, Step};
pub use validate::{statistics, validate};

pub use fair_algo::{BalanceOutcome, Strategy, Transfer};

/// Engine identifiers echoed into run records.
pub const ENGINE_NAME: &str = "fairshare";
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
