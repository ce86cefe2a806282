//! Store/competitor entities.
//!
//! Order matters: the allocator walks stores in insertion order and, inside a
//! store, competitors in insertion order ("last competitor absorbs the
//! remainder"). Both levels are therefore plain vectors with uniqueness checks
//! instead of hashed maps.

use crate::errors::CoreError;
use crate::tokens::{CompetitorName, StoreName};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/* ------------------------------- Input shape ------------------------------ */

/// One (store, competitor) pairing. `amount == None` means "not set yet".
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Slot {
    pub competitor: CompetitorName,
    pub amount: Option<u64>,
}

/// A store owning `quantity` units to split among its competitors.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Store {
    pub name: StoreName,
    pub quantity: u64,
    slots: Vec<Slot>,
}

impl Store {
    pub fn new(name: StoreName, quantity: u64) -> Self {
        Self { name, quantity, slots: Vec::new() }
    }

    /// Build a store whose competitors all start unset.
    pub fn with_competitors<I>(name: StoreName, quantity: u64, competitors: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = CompetitorName>,
    {
        let mut store = Self::new(name, quantity);
        for c in competitors {
            store.add_competitor(c, None)?;
        }
        Ok(store)
    }

    /// Append a competitor; names must be unique within the store.
    pub fn add_competitor(&mut self, competitor: CompetitorName, amount: Option<u64>) -> Result<(), CoreError> {
        if self.contains(competitor.as_str()) {
            return Err(CoreError::DuplicateCompetitor {
                store: self.name.to_string(),
                competitor: competitor.to_string(),
            });
        }
        self.slots.push(Slot { competitor, amount });
        Ok(())
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Set the amount of an existing competitor. Returns `false` if absent.
    pub fn set_amount(&mut self, competitor: &str, amount: Option<u64>) -> bool {
        match self.slots.iter_mut().find(|s| s.competitor == competitor) {
            Some(slot) => {
                slot.amount = amount;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, competitor: &str) -> bool {
        self.slots.iter().any(|s| s.competitor == competitor)
    }

    /// `None` if the competitor is not tracked here; `Some(None)` if unset.
    pub fn amount_of(&self, competitor: &str) -> Option<Option<u64>> {
        self.slots.iter().find(|s| s.competitor == competitor).map(|s| s.amount)
    }

    pub fn competitors(&self) -> impl Iterator<Item = &CompetitorName> {
        self.slots.iter().map(|s| &s.competitor)
    }

    /// Sum of set amounts (unset slots count as zero).
    pub fn allocated_sum(&self) -> u64 {
        self.slots.iter().filter_map(|s| s.amount).sum()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Ordered collection of stores with unique names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StoreSet {
    stores: Vec<Store>,
}

impl StoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a store; names must be unique.
    pub fn push(&mut self, store: Store) -> Result<(), CoreError> {
        if self.get(store.name.as_str()).is_some() {
            return Err(CoreError::DuplicateStore(store.name.to_string()));
        }
        self.stores.push(store);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Store> {
        self.stores.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Store> {
        self.stores.iter()
    }

    /// Mutable walk in insertion order (amounts only; names stay fixed by convention).
    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, Store> {
        self.stores.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn total_quantity(&self) -> u64 {
        self.stores.iter().map(|s| s.quantity).sum()
    }

    /// Copy of the same shape with every amount unset.
    pub fn cleared(&self) -> Self {
        let stores = self
            .stores
            .iter()
            .map(|s| Store {
                name: s.name.clone(),
                quantity: s.quantity,
                slots: s
                    .slots
                    .iter()
                    .map(|slot| Slot { competitor: slot.competitor.clone(), amount: None })
                    .collect(),
            })
            .collect();
        Self { stores }
    }
}

impl<'a> IntoIterator for &'a StoreSet {
    type Item = &'a Store;
    type IntoIter = core::slice::Iter<'a, Store>;
    fn into_iter(self) -> Self::IntoIter {
        self.stores.iter()
    }
}

/* ------------------------------- Output shape ----------------------------- */

/// Final per-store allocation; every amount is concrete.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AllocatedStore {
    pub name: StoreName,
    pub quantity: u64,
    pub amounts: Vec<(CompetitorName, u64)>,
}

impl AllocatedStore {
    pub fn sum(&self) -> u64 {
        self.amounts.iter().map(|(_, a)| *a).sum()
    }

    pub fn amount_of(&self, competitor: &str) -> Option<u64> {
        self.amounts.iter().find(|(c, _)| c == competitor).map(|(_, a)| *a)
    }
}

/// Result of `distribute`: same stores and competitors as the input, in the
/// same order, with a non-negative integer per slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Allocation {
    stores: Vec<AllocatedStore>,
}

impl Allocation {
    pub fn from_stores(stores: Vec<AllocatedStore>) -> Self {
        Self { stores }
    }

    pub fn stores(&self) -> &[AllocatedStore] {
        &self.stores
    }

    pub fn get(&self, store: &str) -> Option<&AllocatedStore> {
        self.stores.iter().find(|s| s.name == store)
    }

    pub fn amount(&self, store: &str, competitor: &str) -> Option<u64> {
        self.get(store).and_then(|s| s.amount_of(competitor))
    }

    /// Per-competitor `(name, total, store_count)` in first-appearance order.
    pub fn competitor_totals(&self) -> Vec<(CompetitorName, u64, u32)> {
        let mut out: Vec<(CompetitorName, u64, u32)> = Vec::new();
        for store in &self.stores {
            for (name, amount) in &store.amounts {
                match out.iter_mut().find(|(n, _, _)| n == name) {
                    Some(entry) => {
                        entry.1 += amount;
                        entry.2 += 1;
                    }
                    None => out.push((name.clone(), *amount, 1)),
                }
            }
        }
        out
    }

    /// Convert back into the input shape (all amounts set) for revalidation.
    pub fn to_store_set(&self) -> StoreSet {
        let stores = self
            .stores
            .iter()
            .map(|s| Store {
                name: s.name.clone(),
                quantity: s.quantity,
                slots: s
                    .amounts
                    .iter()
                    .map(|(c, a)| Slot { competitor: c.clone(), amount: Some(*a) })
                    .collect(),
            })
            .collect();
        StoreSet { stores }
    }
}
