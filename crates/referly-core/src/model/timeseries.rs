// ── Daily time series types ──

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar day of event counts.
///
/// A series is one point per day in `[start, end]` inclusive, sorted
/// ascending with no gaps or duplicates; rebuilt in full on every refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Event type -> count for this day. Empty for zero-filled days.
    pub event_counts: BTreeMap<String, u64>,
}

impl TimeSeriesPoint {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            event_counts: BTreeMap::new(),
        }
    }

    /// Count for one event type, zero if absent.
    pub fn count(&self, event_type: &str) -> u64 {
        self.event_counts.get(event_type).copied().unwrap_or(0)
    }
}
