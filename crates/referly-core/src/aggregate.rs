// ── Dashboard aggregation ──
//
// Folds the normalized referral-code collection into the process-wide
// summary. Pure and deterministic under any ordering of the input.

use chrono::{DateTime, Utc};

use crate::earnings::round2;
use crate::error::CoreError;
use crate::model::{DashboardStats, EarningsBreakdown, ReferralCode, ReferralStatus};

impl DashboardStats {
    /// Fold a code collection into summary statistics.
    ///
    /// Status buckets are counted per code, `event_stats` keys are summed
    /// across codes, and earnings breakdowns are unioned the same way.
    /// The result currency is the currency of the first code with any
    /// earnings; if a later code's currency differs the whole aggregation
    /// fails with [`CoreError::MixedCurrencies`] instead of silently
    /// summing incomparable amounts.
    pub fn aggregate(codes: &[ReferralCode]) -> Result<Self, CoreError> {
        let mut stats = Self::default();
        let mut currency: Option<String> = None;

        for code in codes {
            stats.total_codes += 1;
            match code.status {
                ReferralStatus::Active => stats.active_codes += 1,
                ReferralStatus::Inactive => stats.inactive_codes += 1,
                ReferralStatus::Exhausted => stats.exhausted_codes += 1,
            }

            for (event, count) in &code.event_stats {
                *stats.event_stats.entry(event.clone()).or_insert(0) += count;
            }

            if !code.earnings.breakdown.is_empty() {
                match &currency {
                    None => currency = Some(code.earnings.currency.clone()),
                    Some(expected) if *expected != code.earnings.currency => {
                        return Err(CoreError::MixedCurrencies {
                            expected: expected.clone(),
                            found: code.earnings.currency.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }

            for (event, amount) in &code.earnings.breakdown {
                let entry = stats
                    .total_earnings
                    .breakdown
                    .entry(event.clone())
                    .or_insert(0.0);
                *entry = round2(*entry + amount);
            }
        }

        stats.total_earnings.total = round2(stats.total_earnings.breakdown.values().sum());
        if let Some(currency) = currency {
            stats.total_earnings.currency = currency;
        }
        Ok(stats)
    }
}

/// Earliest `start_date` across the collection, if any code has one.
///
/// Used as the default lower bound for earnings-period displays.
pub fn earliest_start_date(codes: &[ReferralCode]) -> Option<DateTime<Utc>> {
    codes.iter().filter_map(|c| c.start_date).min()
}
