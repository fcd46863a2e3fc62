// ── Reactive data store ──
//
// Holds the derived dashboard state: the normalized code collection, its
// aggregate stats, the daily time series, and the event-label union.
// Each piece lives in a generation-tagged slot (see `slot.rs`) so late
// out-of-order refresh results never overwrite newer data.

mod slot;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{DashboardStats, EventUnionMap, ReferralCode, TimeSeriesPoint};
use slot::Slot;

pub use slot::Versioned;

pub struct DataStore {
    codes: Slot<Vec<ReferralCode>>,
    stats: Slot<DashboardStats>,
    series: Slot<Vec<TimeSeriesPoint>>,
    event_union: Slot<EventUnionMap>,
    /// Generation allocator; one generation per refresh cycle.
    next_generation: AtomicU64,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (last_refresh, _) = watch::channel(None);
        Self {
            codes: Slot::new(Vec::new()),
            stats: Slot::new(DashboardStats::default()),
            series: Slot::new(Vec::new()),
            event_union: Slot::new(EventUnionMap::new()),
            next_generation: AtomicU64::new(1),
            last_refresh,
        }
    }

    /// Allocate the generation for a new refresh cycle.
    pub fn begin_refresh(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::Relaxed)
    }

    /// Apply the code collection and its derived aggregates.
    ///
    /// Returns `false` if a newer refresh already landed; the series slot
    /// is independent, so a slow purchase-history fetch cannot block or
    /// be blocked by the codes side.
    pub fn apply_codes(
        &self,
        generation: u64,
        codes: Vec<ReferralCode>,
        stats: DashboardStats,
        event_union: EventUnionMap,
    ) -> bool {
        let applied = self.codes.apply(generation, codes);
        if applied {
            self.stats.apply(generation, stats);
            self.event_union.apply(generation, event_union);
            // send_replace: the stamp must land even with no subscribers.
            self.last_refresh.send_replace(Some(Utc::now()));
        }
        applied
    }

    /// Apply a rebuilt time series.
    pub fn apply_series(&self, generation: u64, series: Vec<TimeSeriesPoint>) -> bool {
        self.series.apply(generation, series)
    }

    // ── Snapshots ────────────────────────────────────────────────────

    pub fn codes(&self) -> Arc<Vec<ReferralCode>> {
        self.codes.get()
    }

    pub fn stats(&self) -> Arc<DashboardStats> {
        self.stats.get()
    }

    pub fn series(&self) -> Arc<Vec<TimeSeriesPoint>> {
        self.series.get()
    }

    pub fn event_union(&self) -> Arc<EventUnionMap> {
        self.event_union.get()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_codes(&self) -> watch::Receiver<Versioned<Vec<ReferralCode>>> {
        self.codes.subscribe()
    }

    pub fn subscribe_stats(&self) -> watch::Receiver<Versioned<DashboardStats>> {
        self.stats.subscribe()
    }

    pub fn subscribe_series(&self) -> watch::Receiver<Versioned<Vec<TimeSeriesPoint>>> {
        self.series.subscribe()
    }

    pub fn subscribe_last_refresh(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_refresh.subscribe()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
