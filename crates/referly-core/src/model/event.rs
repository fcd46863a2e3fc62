// ── Normalized event domain types ──

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which wire generation an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    /// Legacy fixed-shape purchase record (`INITIAL_PURCHASE` etc.).
    Purchase,
    /// Dynamic open-vocabulary `{ type, date, ... }` record.
    Activity,
}

/// The single canonical event shape.
///
/// Both wire generations are coerced into this at the ingestion boundary
/// so that neither raw shape leaks into aggregation logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// Open string key (`"free_trial"`, `"purchase"`, `"3_meals_logged"`, ...).
    pub event_type: String,
    pub source: EventSource,
    pub date: Option<DateTime<Utc>>,
    /// Original record, kept for consumers that need raw fields.
    pub raw: serde_json::Value,
}

/// A referred user with their normalized event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedUser {
    pub user_id: String,
    /// The signup timestamp. Strictly this field -- a user without it
    /// contributes no signup to the time series, regardless of other
    /// qualifying events.
    pub referral_created_at: Option<DateTime<Utc>>,
    pub events: Vec<NormalizedEvent>,
}

/// Presentation metadata for one event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    pub display_name: String,
    /// True when any commission rule for this event carries a positive
    /// rate -- derived from configuration only.
    pub is_monetary: bool,
}

/// Event type -> presentation metadata, unioned across every known
/// referral code's commission configuration. Carries no state between
/// refreshes; purely a presentation lookup.
pub type EventUnionMap = BTreeMap<String, EventMeta>;
