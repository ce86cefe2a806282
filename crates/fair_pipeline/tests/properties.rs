use fair_core::{CompetitorName, Params, Store, StoreName, StoreSet};
use fair_pipeline::{distribute, distribute_traced, validate};
use proptest::prelude::*;
use proptest::sample::subsequence;

const POOL: [&str; 6] = ["North", "South", "East", "West", "Hub", "Outlet"];

prop_compose! {
    /// Store sets where every store can hold the minimum for each of its competitors.
    fn arb_feasible()(
        rows in prop::collection::vec((subsequence(POOL.to_vec(), 1..=POOL.len()), 0u64..400), 1..5),
        minimum in 0u64..30,
    ) -> (StoreSet, u64) {
        let mut set = StoreSet::new();
        for (i, (competitors, slack)) in rows.iter().enumerate() {
            let quantity = minimum * competitors.len() as u64 + slack;
            let store = Store::with_competitors(
                StoreName::new(format!("Store {i}")).unwrap(),
                quantity,
                competitors.iter().map(|c| CompetitorName::new(*c).unwrap()),
            )
            .unwrap();
            set.push(store).unwrap();
        }
        (set, minimum)
    }
}

proptest! {
    #[test]
    fn revalidation_finds_no_structural_errors((set, minimum) in arb_feasible(), ceiling in 5.0f64..60.0) {
        let params = Params::new(minimum, ceiling);
        let alloc = distribute(&set, &params).unwrap();
        let report = validate(&alloc.to_store_set(), &params);
        prop_assert!(report.errors.iter().all(|e| e.starts_with("variance")), "{:?}", report.errors);
        prop_assert_eq!(report.statistics.total_products, set.total_quantity());
    }

    #[test]
    fn traced_and_plain_runs_agree((set, minimum) in arb_feasible()) {
        let params = Params::new(minimum, 15.0);
        let run = distribute_traced(&set, &params).unwrap();
        prop_assert_eq!(&run.allocation, &distribute(&set, &params).unwrap());
        prop_assert_eq!(run.validation, validate(&run.allocation.to_store_set(), &params));
    }
}
