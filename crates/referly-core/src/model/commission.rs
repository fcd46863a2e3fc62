// ── Commission rule and earnings domain types ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One commission rule a referral code earns on.
///
/// `event` is an open string key, not a closed enum -- new earning
/// activities are introduced through backend configuration, never through
/// code changes here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionRule {
    pub event: String,
    pub rate: f64,
    pub currency: String,
    pub display_name: Option<String>,
}

/// Derived per-event earnings, immutable once computed.
///
/// Invariant: `total` equals the 2-decimal-rounded sum of `breakdown`
/// values. Recomputed whenever the source counts or rules change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsBreakdown {
    /// Event type -> earned amount, rounded to 2 decimals per entry.
    pub breakdown: BTreeMap<String, f64>,
    pub total: f64,
    pub currency: String,
}

impl EarningsBreakdown {
    /// A zero breakdown in the given currency.
    pub fn empty(currency: impl Into<String>) -> Self {
        Self {
            breakdown: BTreeMap::new(),
            total: 0.0,
            currency: currency.into(),
        }
    }
}

impl Default for EarningsBreakdown {
    fn default() -> Self {
        Self::empty("USD")
    }
}
