//! Validation report model.
//!
//! `errors` are blocking findings (`valid == false` iff non-empty);
//! `warnings` are advisory and never affect validity.

use crate::tokens::CompetitorName;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    Info,
    Attention,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Attention => "attention",
            Severity::Critical => "critical",
        }
    }
}

/// Advisory note about the structure of the input or the result.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Warning {
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub suggestions: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompetitorStat {
    pub name: CompetitorName,
    pub total: u64,
    pub store_count: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Statistics {
    pub total_products: u64,
    pub competitor_count: usize,
    pub mean_per_competitor: f64,
    /// Largest group variance percent across appearance-count groups.
    pub variance_percent: f64,
    /// Per-competitor totals in first-appearance order.
    pub competitors: Vec<CompetitorStat>,
}

impl Statistics {
    pub fn competitor(&self, name: &str) -> Option<&CompetitorStat> {
        self.competitors.iter().find(|c| c.name == name)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<Warning>,
    pub statistics: Statistics,
}

impl ValidationResult {
    pub fn warnings_with(&self, severity: Severity) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.severity == severity)
    }
}
