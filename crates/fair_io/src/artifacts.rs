//! Wire shapes shared by the loader and the CLI writers.
//!
//! Store sets and allocations use the same object-keyed-by-store form the
//! loader accepts, so an `allocation.json` can be fed back to `--check`:
//!
//! ```json
//! { "Store 1": { "quantity": 180, "competitors": { "A": 60, "B": null } } }
//! ```

use serde_json::{Map, Value};

use fair_core::{Allocation, StoreSet};

pub const FIELD_QUANTITY: &str = "quantity";
pub const FIELD_COMPETITORS: &str = "competitors";

/// Store set → wire value; unset amounts become `null`.
pub fn store_set_to_value(stores: &StoreSet) -> Value {
    let mut root = Map::new();
    for store in stores {
        let mut comps = Map::new();
        for slot in store.slots() {
            comps.insert(slot.competitor.to_string(), slot.amount.map_or(Value::Null, Value::from));
        }
        root.insert(store.name.to_string(), store_entry(store.quantity, comps));
    }
    Value::Object(root)
}

/// Allocation → wire value (every amount concrete).
pub fn allocation_to_value(alloc: &Allocation) -> Value {
    let mut root = Map::new();
    for store in alloc.stores() {
        let comps: Map<String, Value> =
            store.amounts.iter().map(|(c, a)| (c.to_string(), Value::from(*a))).collect();
        root.insert(store.name.to_string(), store_entry(store.quantity, comps));
    }
    Value::Object(root)
}

fn store_entry(quantity: u64, competitors: Map<String, Value>) -> Value {
    let mut entry = Map::new();
    entry.insert(FIELD_QUANTITY.into(), Value::from(quantity));
    entry.insert(FIELD_COMPETITORS.into(), Value::Object(competitors));
    Value::Object(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use fair_core::{AllocatedStore, CompetitorName, Store, StoreName};
    use serde_json::json;

    fn sn(s: &str) -> StoreName { s.parse().unwrap() }
    fn cn(s: &str) -> CompetitorName { s.parse().unwrap() }

    #[test]
    fn allocation_shape() {
        let alloc = Allocation::from_stores(vec![AllocatedStore {
            name: sn("Store 1"),
            quantity: 100,
            amounts: vec![(cn("B"), 60), (cn("A"), 40)],
        }]);
        let v = allocation_to_value(&alloc);
        assert_json_eq!(v, json!({"Store 1": {"quantity": 100, "competitors": {"B": 60, "A": 40}}}));
        // insertion order survives
        let keys: Vec<&String> = v["Store 1"]["competitors"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["B", "A"]);
    }

    #[test]
    fn unset_amounts_are_null() {
        let mut set = StoreSet::new();
        let mut st = Store::new(sn("S"), 5);
        st.add_competitor(cn("A"), None).unwrap();
        st.add_competitor(cn("B"), Some(5)).unwrap();
        set.push(st).unwrap();
        assert_json_eq!(
            store_set_to_value(&set),
            json!({"S": {"quantity": 5, "competitors": {"A": null, "B": 5}}})
        );
    }
}
