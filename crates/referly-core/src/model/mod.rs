// ── Unified domain model ──
//
// Every type in this module is the canonical representation of an
// affiliate entity. Raw backend records (both the legacy purchase-event
// shape and the dynamic event shape) are converted into these types at
// the ingestion boundary; consumers (CLI, tests) depend only on them.

pub mod commission;
pub mod event;
pub mod referral;
pub mod stats;
pub mod timeseries;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use referly_core::model::*` gives you everything.

pub use commission::{CommissionRule, EarningsBreakdown};
pub use event::{EventMeta, EventSource, EventUnionMap, NormalizedEvent, NormalizedUser};
pub use referral::{ReferralCode, ReferralStatus};
pub use stats::DashboardStats;
pub use timeseries::TimeSeriesPoint;
