// ── Referral code domain types ──

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::commission::{CommissionRule, EarningsBreakdown};

/// Lifecycle status of a referral code.
///
/// Always derived from `(now, start_date, end_date, quota, event totals)`
/// at transform time -- never stored independently. The schedule rule
/// takes priority over quota exhaustion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReferralStatus {
    Active,
    Inactive,
    Exhausted,
}

/// The canonical referral code.
///
/// Created by [`ReferralCode::from_raw`](crate::convert) from one backend
/// record; never mutated in place. A status change requires re-deriving a
/// new instance from fresh data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralCode {
    pub id: String,
    /// Human-facing code string (e.g. `"SPRING24"`).
    pub code: String,
    /// Falls back to `start_date`, then to the transform time, when the
    /// backend omits it -- do not treat as an immutable historical fact
    /// unless the source provided one.
    pub created_at: DateTime<Utc>,
    pub status: ReferralStatus,
    pub commission_config: Vec<CommissionRule>,
    pub quota: Option<u64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub duration_days: Option<u32>,
    /// All conversion counters, including the implicit `"signup"` event.
    pub event_stats: BTreeMap<String, u64>,
    pub total_referrals: u64,
    /// Derived via the earnings calculator from `event_stats` and
    /// `commission_config`.
    pub earnings: EarningsBreakdown,
}

impl ReferralCode {
    /// Sum of all event counters (includes signups).
    pub fn total_conversions(&self) -> u64 {
        self.event_stats.values().sum()
    }

    /// The `"signup"` counter, zero if absent.
    pub fn signups(&self) -> u64 {
        self.event_stats.get("signup").copied().unwrap_or(0)
    }
}
