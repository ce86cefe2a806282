//! Run parameters with safe defaults and domain checks.
//!
//! Field aliases accept the camelCase and legacy Portuguese spellings so that
//! parameter files produced by older tooling load unchanged.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default bound on variance-balancing rounds.
pub const DEFAULT_MAX_BALANCE_ITERATIONS: u32 = 1000;

/// Default tolerance (percentage points) above `max_variance_percent` before
/// the validator reports variance as an error.
pub const DEFAULT_VARIANCE_TOLERANCE_POINTS: f64 = 5.0;

#[cfg(feature = "serde")]
fn default_iterations() -> u32 {
    DEFAULT_MAX_BALANCE_ITERATIONS
}

#[cfg(feature = "serde")]
fn default_tolerance() -> f64 {
    DEFAULT_VARIANCE_TOLERANCE_POINTS
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Params {
    /// Floor per (store, competitor) slot.
    #[cfg_attr(feature = "serde", serde(alias = "minimumPerCompetitor", alias = "quantidadeMinimaPorConcorrente"))]
    pub minimum_per_competitor: u64,

    /// Ceiling on `(max − min) / mean × 100` inside an appearance-count group.
    #[cfg_attr(feature = "serde", serde(alias = "maxVariancePercent", alias = "varianciaMaximaPermitida"))]
    pub max_variance_percent: f64,

    /// Upper bound on balancing rounds (≥ 1).
    #[cfg_attr(
        feature = "serde",
        serde(default = "default_iterations", alias = "maxBalanceIterations", alias = "maxIteracoesBalanceamento")
    )]
    pub max_balance_iterations: u32,

    /// Extra percentage points tolerated by the validator above the ceiling.
    #[cfg_attr(feature = "serde", serde(default = "default_tolerance", alias = "varianceTolerancePoints"))]
    pub variance_tolerance_points: f64,
}

impl Params {
    pub fn new(minimum_per_competitor: u64, max_variance_percent: f64) -> Self {
        Self {
            minimum_per_competitor,
            max_variance_percent,
            max_balance_iterations: DEFAULT_MAX_BALANCE_ITERATIONS,
            variance_tolerance_points: DEFAULT_VARIANCE_TOLERANCE_POINTS,
        }
    }

    pub fn with_max_balance_iterations(mut self, n: u32) -> Self {
        self.max_balance_iterations = n;
        self
    }

    pub fn with_variance_tolerance_points(mut self, points: f64) -> Self {
        self.variance_tolerance_points = points;
        self
    }

    /// Variance above this value is a blocking validation error.
    pub fn variance_error_threshold(&self) -> f64 {
        self.max_variance_percent + self.variance_tolerance_points
    }

    /// Domain checks; call before running the engine.
    pub fn validate_domains(&self) -> Result<(), VarsError> {
        if !self.max_variance_percent.is_finite() || self.max_variance_percent < 0.0 {
            return Err(VarsError::Domain(format!(
                "max_variance_percent must be finite and >= 0, got {}",
                self.max_variance_percent
            )));
        }
        if self.max_balance_iterations == 0 {
            return Err(VarsError::Domain("max_balance_iterations must be >= 1".into()));
        }
        if !self.variance_tolerance_points.is_finite() || self.variance_tolerance_points < 0.0 {
            return Err(VarsError::Domain(format!(
                "variance_tolerance_points must be finite and >= 0, got {}",
                self.variance_tolerance_points
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarsError {
    Domain(String),
}

impl fmt::Display for VarsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarsError::Domain(m) => write!(f, "parameter domain error: {m}"),
        }
    }
}

impl std::error::Error for VarsError {}
