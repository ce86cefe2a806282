//! Property tests for the allocation passes run end to end.

use fair_algo::{
    allocate_even_split, allocate_proportional, balance_variance, prepare_ideals, repair_all,
    select_strategy, compute_totals, Strategy, WorkingSet,
};
use fair_core::{Allocation, CompetitorName, Store, StoreName, StoreSet};
use proptest::prelude::*;
use proptest::sample::subsequence;

const POOL: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];

fn build(rows: &[(Vec<&'static str>, u64)], minimum: u64) -> StoreSet {
    let mut set = StoreSet::new();
    for (i, (competitors, extra)) in rows.iter().enumerate() {
        let quantity = minimum * competitors.len() as u64 + extra;
        let store = Store::with_competitors(
            StoreName::new(format!("S{i}")).unwrap(),
            quantity,
            competitors.iter().map(|c| CompetitorName::new(*c).unwrap()),
        )
        .unwrap();
        set.push(store).unwrap();
    }
    set
}

fn run(set: &StoreSet, minimum: u64, max_variance: f64) -> (Allocation, Strategy) {
    let mut ws = WorkingSet::new(set);
    let strategy = select_strategy(&compute_totals(set));
    match strategy {
        Strategy::Adaptive => allocate_even_split(&mut ws, minimum),
        Strategy::Proportional => {
            prepare_ideals(&mut ws);
            allocate_proportional(&mut ws, minimum);
            balance_variance(&mut ws, max_variance, minimum, 200);
        }
    }
    repair_all(&mut ws, minimum);
    (ws.into_allocation(), strategy)
}

prop_compose! {
    fn arb_input()(
        rows in prop::collection::vec((subsequence(POOL.to_vec(), 1..=POOL.len()), 0u64..500), 1..6),
        minimum in 0u64..25,
    ) -> (Vec<(Vec<&'static str>, u64)>, u64) {
        (rows, minimum)
    }
}

proptest! {
    #[test]
    fn sums_match_and_minimum_holds((rows, minimum) in arb_input(), max_variance in 0.0f64..40.0) {
        let set = build(&rows, minimum);
        let (alloc, _) = run(&set, minimum, max_variance);
        for store in alloc.stores() {
            prop_assert_eq!(store.sum(), store.quantity);
            prop_assert!(store.amounts.iter().all(|(_, a)| *a >= minimum));
        }
    }

    #[test]
    fn same_input_same_output((rows, minimum) in arb_input()) {
        let set = build(&rows, minimum);
        let first = run(&set, minimum, 10.0);
        let second = run(&set, minimum, 10.0);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn output_keeps_input_shape((rows, minimum) in arb_input()) {
        let set = build(&rows, minimum);
        let (alloc, _) = run(&set, minimum, 15.0);
        prop_assert_eq!(alloc.stores().len(), set.len());
        for (out, inp) in alloc.stores().iter().zip(set.iter()) {
            prop_assert_eq!(&out.name, &inp.name);
            let names: Vec<&CompetitorName> = out.amounts.iter().map(|(c, _)| c).collect();
            let expected: Vec<&CompetitorName> = inp.competitors().collect();
            prop_assert_eq!(names, expected);
        }
    }
}
