//! fair_core — Core types, parameters, report model, and shared numerics.
//!
//! This crate is **I/O-free**. It defines the stable types used across the
//! engine (`fair_algo`, `fair_pipeline`, `fair_io`, `fair_cli`).
//!
//! - Name tokens: `StoreName`, `CompetitorName`
//! - Input/working shape: `StoreSet` → `Store` → `Slot` (amount may be unset)
//! - Output shape: `Allocation` (every amount concrete)
//! - Run parameters: `Params`
//! - Validation report: `ValidationResult`, `Warning`, `Severity`, `Statistics`
//! - Integer-first numerics shared by the balancer and the validator
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod errors {
    use core::fmt;

    /// Minimal error set for building and querying core entities.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidName,
        DuplicateStore(String),
        DuplicateCompetitor { store: String, competitor: String },
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidName => write!(f, "invalid name (empty or blank)"),
                CoreError::DuplicateStore(s) => write!(f, "duplicate store: {s}"),
                CoreError::DuplicateCompetitor { store, competitor } => {
                    write!(f, "duplicate competitor {competitor} in store {store}")
                }
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod tokens {
    //! Name newtypes. Identity of a competitor is its name, shared across stores.

    use crate::errors::CoreError;
    use core::fmt;
    use core::str::FromStr;

    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    fn is_name(s: &str) -> bool {
        !s.trim().is_empty()
    }

    macro_rules! def_name {
        ($name:ident) => {
            #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
            #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
            #[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
            pub struct $name(String);

            impl $name {
                pub fn new(s: impl Into<String>) -> Result<Self, CoreError> {
                    let s = s.into();
                    if is_name(&s) { Ok(Self(s)) } else { Err(CoreError::InvalidName) }
                }
                pub fn as_str(&self) -> &str { &self.0 }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
            }

            impl FromStr for $name {
                type Err = CoreError;
                fn from_str(s: &str) -> Result<Self, Self::Err> { Self::new(s) }
            }

            impl TryFrom<String> for $name {
                type Error = CoreError;
                fn try_from(s: String) -> Result<Self, Self::Error> { Self::new(s) }
            }

            impl From<$name> for String {
                fn from(n: $name) -> String { n.0 }
            }

            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str { &self.0 }
            }

            impl PartialEq<str> for $name {
                fn eq(&self, other: &str) -> bool { self.0 == other }
            }

            impl PartialEq<&str> for $name {
                fn eq(&self, other: &&str) -> bool { self.0 == *other }
            }
        };
    }

    def_name!(StoreName);
    def_name!(CompetitorName);
}

pub mod rounding {
    //! Numerics shared by the allocator, the balancer and the validator.

    /// Round half away from zero. Inputs here are non-negative, so this is
    /// also "round half up".
    #[inline]
    pub fn round_half_away(x: f64) -> i64 {
        x.round() as i64
    }

    /// Arithmetic mean of non-negative totals; `0.0` for an empty slice.
    pub fn mean(values: &[u64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let sum: u128 = values.iter().map(|&v| v as u128).sum();
        sum as f64 / values.len() as f64
    }

    /// Group spread `(max − min) / mean × 100`.
    ///
    /// Fewer than two values, or a zero mean, have no measurable spread and
    /// yield `0.0`.
    pub fn variance_percent(values: &[u64]) -> f64 {
        if values.len() < 2 {
            return 0.0;
        }
        let m = mean(values);
        if m == 0.0 {
            return 0.0;
        }
        let max = values.iter().copied().max().unwrap_or(0);
        let min = values.iter().copied().min().unwrap_or(0);
        (max - min) as f64 / m * 100.0
    }
}

pub mod determinism;
pub mod entities;
pub mod report;
pub mod variables;

pub use entities::{AllocatedStore, Allocation, Slot, Store, StoreSet};
pub use errors::CoreError;
pub use report::{CompetitorStat, Severity, Statistics, ValidationResult, Warning};
pub use tokens::{CompetitorName, StoreName};
pub use variables::{Params, VarsError};

#[cfg(test)]
mod tests {
    use super::rounding::*;
    use super::tokens::*;

    #[test]
    fn names_reject_blank() {
        assert!(StoreName::new("").is_err());
        assert!(CompetitorName::new("   ").is_err());
        assert_eq!(StoreName::new("Store 1").unwrap().as_str(), "Store 1");
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_half_away(2.5), 3);
        assert_eq!(round_half_away(2.4999), 2);
        assert_eq!(round_half_away(0.5), 1);
        assert_eq!(round_half_away(0.0), 0);
    }

    #[test]
    fn variance_of_group() {
        assert_eq!(variance_percent(&[]), 0.0);
        assert_eq!(variance_percent(&[42]), 0.0);
        assert_eq!(variance_percent(&[0, 0]), 0.0);
        // mean 100, spread 20
        assert!((variance_percent(&[90, 110]) - 20.0).abs() < 1e-9);
        assert!((variance_percent(&[100, 100, 100]) - 0.0).abs() < 1e-12);
    }
}
