// ── Dashboard aggregate types ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::commission::EarningsBreakdown;

/// Process-wide summary over all referral codes.
///
/// Fully recomputed from the current code collection on every refresh;
/// never partially updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_codes: u64,
    pub active_codes: u64,
    pub inactive_codes: u64,
    pub exhausted_codes: u64,
    /// Event type -> summed count across all codes.
    pub event_stats: BTreeMap<String, u64>,
    /// Unioned earnings across all codes.
    pub total_earnings: EarningsBreakdown,
}

impl DashboardStats {
    /// A zeroed-out stats structure in the given default currency.
    pub fn empty(currency: impl Into<String>) -> Self {
        Self {
            total_codes: 0,
            active_codes: 0,
            inactive_codes: 0,
            exhausted_codes: 0,
            event_stats: BTreeMap::new(),
            total_earnings: EarningsBreakdown::empty(currency),
        }
    }
}

impl Default for DashboardStats {
    fn default() -> Self {
        Self::empty("USD")
    }
}
