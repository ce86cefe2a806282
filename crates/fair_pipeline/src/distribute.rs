//! DISTRIBUTE stage: input store set → concrete allocation.
//!
//! Flow:
//!   preflight (params domains, empty stores)
//!   → working copy + totals → mode selection
//!   → adaptive: even split per store
//!   → proportional: ideals → per-store deficit split (+ local repair) → variance balancing
//!   → global exact-sum repair → allocation
//!
//! The caller's `StoreSet` is only read; every mutation happens on the
//! private `WorkingSet`.

use fair_algo::{
    allocate_even_split, allocate_store, balance_variance, prepare_ideals, repair_all, select_strategy,
    BalanceOutcome, Strategy, Totals, WorkingSet,
};
use fair_core::{Allocation, Params, StoreSet, VarsError};
use thiserror::Error;
use tracing::{debug, info};

use crate::trace::{DistributionRun, NoTrace, Phase, Record, Recorder};
use crate::validate::validate;

#[derive(Debug, Error)]
pub enum DistributeError {
    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] VarsError),
    #[error("store '{store}' has quantity {quantity} but no competitors")]
    EmptyStore { store: String, quantity: u64 },
}

/// Allocate every store's quantity among its competitors.
pub fn distribute(stores: &StoreSet, params: &Params) -> Result<Allocation, DistributeError> {
    let out = run(stores, params, &mut NoTrace)?;
    Ok(out.ws.into_allocation())
}

/// Same computation as `distribute`, plus the step history and the
/// validation of the result.
pub fn distribute_traced(stores: &StoreSet, params: &Params) -> Result<DistributionRun, DistributeError> {
    let mut rec = Recorder::default();
    let out = run(stores, params, &mut rec)?;

    let validation = validate(&out.ws.snapshot(), params);
    let valid = validation.valid;
    let description = if valid {
        "allocation passes validation".to_string()
    } else {
        format!("allocation fails validation ({} error(s))", validation.errors.len())
    };
    rec.record(&out.ws, Phase::Final { valid }, description);

    Ok(DistributionRun {
        strategy: out.strategy,
        allocation: out.ws.into_allocation(),
        balance: out.balance,
        validation,
        steps: rec.steps,
    })
}

struct RunOut {
    strategy: Strategy,
    balance: Option<BalanceOutcome>,
    ws: WorkingSet,
}

fn preflight(stores: &StoreSet, params: &Params) -> Result<(), DistributeError> {
    params.validate_domains()?;
    for store in stores {
        if store.is_empty() && store.quantity > 0 {
            return Err(DistributeError::EmptyStore { store: store.name.to_string(), quantity: store.quantity });
        }
    }
    Ok(())
}

fn run<R: Record>(stores: &StoreSet, params: &Params, rec: &mut R) -> Result<RunOut, DistributeError> {
    preflight(stores, params)?;
    let minimum = params.minimum_per_competitor;

    let mut ws = WorkingSet::new(stores);
    let totals = Totals {
        total_products: ws.total_products,
        total_slots: ws.total_slots,
        competitors: ws.competitors.clone(),
    };
    let strategy = select_strategy(&totals);
    rec.record(
        &ws,
        Phase::Initial,
        format!(
            "{} store(s), {} competitor(s), {} product(s) over {} slot(s); {:.1}% exclusive",
            stores.len(),
            totals.competitors.len(),
            totals.total_products,
            totals.total_slots,
            totals.exclusive_ratio_pct()
        ),
    );

    if ws.total_slots == 0 {
        debug!("no slots to allocate");
        return Ok(RunOut { strategy, balance: None, ws });
    }

    let mut balance = None;
    match strategy {
        Strategy::Adaptive => {
            allocate_even_split(&mut ws, minimum);
            rec.record(&ws, Phase::AdaptiveSplit, "each store split evenly among its own competitors".into());
        }
        Strategy::Proportional => {
            let ideal_per_slot = prepare_ideals(&mut ws);
            rec.record(
                &ws,
                Phase::IdealTotals { ideal_per_slot },
                format!("ideal per slot {ideal_per_slot:.2}"),
            );

            for ix in 0..ws.stores.len() {
                allocate_store(&mut ws, ix, minimum);
                let store = ws.stores[ix].name.clone();
                let description = format!("{store}: {} unit(s) split by deficit", ws.stores[ix].quantity);
                rec.record(&ws, Phase::StoreAllocated { store }, description);
            }

            let outcome =
                balance_variance(&mut ws, params.max_variance_percent, minimum, params.max_balance_iterations);
            rec.record(
                &ws,
                Phase::Balancing {
                    rounds: outcome.rounds,
                    converged: outcome.converged,
                    transfers: outcome.transfers.clone(),
                },
                format!("{} transfer(s) over {} round(s)", outcome.transfers.len(), outcome.rounds),
            );
            balance = Some(outcome);
        }
    }

    let stores_repaired = repair_all(&mut ws, minimum);
    rec.record(
        &ws,
        Phase::FineAdjustment { stores_repaired },
        format!("{stores_repaired} store sum(s) corrected"),
    );

    info!(
        strategy = %strategy,
        rounds = balance.as_ref().map_or(0, |b| b.rounds),
        variance = ws.max_group_variance(),
        "distribution finished"
    );

    Ok(RunOut { strategy, balance, ws })
}
