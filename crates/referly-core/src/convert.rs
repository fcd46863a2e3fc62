// ── Raw-record to domain conversion ──
//
// One-way mapping from the backend wire types in `referly_api::models`
// into the canonical domain types. All conversion is pure; `now` is a
// parameter so status derivation stays deterministic under test.

use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

use referly_api::models::{RawCommissionRule, RawReferralCode};

use crate::earnings::calculate_earnings;
use crate::model::{CommissionRule, ReferralCode, ReferralStatus};

/// Parse a backend timestamp.
///
/// The backend emits RFC 3339 strings in most deployments but epoch
/// milliseconds (as a bare number string) in older ones. Plain
/// `YYYY-MM-DD` dates resolve to midnight UTC.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ms) = value.parse::<i64>() {
        return Utc.timestamp_millis_opt(ms).single();
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    debug!(%value, "unparseable backend timestamp");
    None
}

/// Parse an epoch-milliseconds timestamp.
pub fn parse_epoch_ms(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

impl From<RawCommissionRule> for CommissionRule {
    fn from(raw: RawCommissionRule) -> Self {
        Self {
            event: raw.event,
            rate: raw.rate,
            currency: raw.currency,
            display_name: raw.display_name,
        }
    }
}

/// Derive lifecycle status.
///
/// The schedule rule (outside the start/end window) takes priority over
/// quota exhaustion; a quota-exhausted code that has also expired reports
/// `inactive`.
fn derive_status(
    now: DateTime<Utc>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    quota: Option<u64>,
    total_conversions: u64,
) -> ReferralStatus {
    let expired = end_date.is_some_and(|end| end < now);
    let not_started = start_date.is_some_and(|start| start > now);
    if expired || not_started {
        return ReferralStatus::Inactive;
    }
    if quota.is_some_and(|q| total_conversions >= q) {
        return ReferralStatus::Exhausted;
    }
    ReferralStatus::Active
}

impl ReferralCode {
    /// Convert one backend record into the canonical domain entity.
    ///
    /// Status and earnings are always re-derived here; nothing from the
    /// backend record is trusted for either. `created_at` falls back to
    /// `start_date`, then to `now`, when the backend omits it.
    pub fn from_raw(raw: RawReferralCode, now: DateTime<Utc>) -> Self {
        let start_date = raw.start_date.as_deref().and_then(parse_datetime);
        let end_date = raw.end_date.as_deref().and_then(parse_datetime);
        let created_at = raw
            .created_at
            .as_deref()
            .and_then(parse_datetime)
            .or(start_date)
            .unwrap_or(now);

        let commission_config: Vec<CommissionRule> = raw
            .commission_config
            .into_iter()
            .map(CommissionRule::from)
            .collect();

        let event_stats = raw.stats.events;
        let total_conversions: u64 = event_stats.values().sum();
        let status = derive_status(now, start_date, end_date, raw.quota, total_conversions);
        let earnings = calculate_earnings(&event_stats, &commission_config);

        Self {
            id: raw.id,
            code: raw.code,
            created_at,
            status,
            commission_config,
            quota: raw.quota,
            start_date,
            end_date,
            duration_days: raw.no_of_days,
            event_stats,
            total_referrals: raw.stats.total_referrals,
            earnings,
        }
    }
}
