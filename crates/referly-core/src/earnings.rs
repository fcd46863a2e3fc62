// ── Earnings calculator ──
//
// Converts raw per-event counters plus a dynamic commission-rule list
// into a currency-tagged earnings breakdown, and folds breakdowns across
// referral codes. All functions are pure and total: missing counters
// default to zero and an empty rule list yields a zero breakdown in USD.

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::CoreError;
use crate::model::{CommissionRule, EarningsBreakdown};

/// Round a currency amount to 2 decimals.
pub(crate) fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Calculate earnings for one referral code from its counters and rules.
///
/// Each rule contributes `count * rate` (rounded to 2 decimals) to its
/// event's breakdown entry. The currency starts as the first rule's and is
/// overwritten by each later rule -- correct only under the
/// single-currency-per-code assumption, so a rule that changes the
/// currency is logged as a data-quality warning.
pub fn calculate_earnings(
    stats: &BTreeMap<String, u64>,
    rules: &[CommissionRule],
) -> EarningsBreakdown {
    let mut breakdown: BTreeMap<String, f64> = BTreeMap::new();
    let mut currency = rules
        .first()
        .map_or_else(|| "USD".to_owned(), |r| r.currency.clone());

    for rule in rules {
        let count = stats.get(&rule.event).copied().unwrap_or(0);
        #[allow(clippy::cast_precision_loss)]
        let earned = round2(count as f64 * rule.rate);
        let entry = breakdown.entry(rule.event.clone()).or_insert(0.0);
        *entry = round2(*entry + earned);

        if !rule.currency.is_empty() {
            if rule.currency != currency {
                warn!(
                    event = %rule.event,
                    from = %currency,
                    to = %rule.currency,
                    "commission rule changes currency mid-code"
                );
            }
            currency = rule.currency.clone();
        }
    }

    let total = round2(breakdown.values().sum());

    EarningsBreakdown {
        breakdown,
        total,
        currency,
    }
}

/// Fold per-code earnings into one global breakdown.
///
/// Sums breakdown amounts per event key across every code. Codes whose
/// computed currencies differ cannot be naively summed; that case fails
/// fast with [`CoreError::MixedCurrencies`] rather than silently keeping
/// the last currency seen. Codes with no rules (USD-defaulted zero
/// breakdowns) do not participate in the currency check.
pub fn calculate_total_earnings<'a, I>(codes: I) -> Result<EarningsBreakdown, CoreError>
where
    I: IntoIterator<Item = (&'a BTreeMap<String, u64>, &'a [CommissionRule])>,
{
    let mut aggregate: BTreeMap<String, f64> = BTreeMap::new();
    let mut currency: Option<String> = None;

    for (stats, rules) in codes {
        let result = calculate_earnings(stats, rules);

        if !result.breakdown.is_empty() {
            match &currency {
                None => currency = Some(result.currency.clone()),
                Some(expected) if *expected != result.currency => {
                    return Err(CoreError::MixedCurrencies {
                        expected: expected.clone(),
                        found: result.currency,
                    });
                }
                Some(_) => {}
            }
        }

        for (event, amount) in result.breakdown {
            let entry = aggregate.entry(event).or_insert(0.0);
            *entry = round2(*entry + amount);
        }
    }

    let total = round2(aggregate.values().sum());

    Ok(EarningsBreakdown {
        breakdown: aggregate,
        total,
        currency: currency.unwrap_or_else(|| "USD".into()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rule(event: &str, rate: f64, currency: &str) -> CommissionRule {
        CommissionRule {
            event: event.into(),
            rate,
            currency: currency.into(),
            display_name: None,
        }
    }

    fn stats(entries: &[(&str, u64)]) -> BTreeMap<String, u64> {
        entries.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect()
    }

    #[test]
    fn spec_example_breakdown() {
        let s = stats(&[("signup", 5), ("purchase", 6)]);
        let rules = vec![rule("signup", 2.0, "USD"), rule("purchase", 50.0, "USD")];

        let earnings = calculate_earnings(&s, &rules);

        assert_eq!(earnings.breakdown.get("signup"), Some(&10.0));
        assert_eq!(earnings.breakdown.get("purchase"), Some(&300.0));
        assert_eq!(earnings.total, 310.0);
        assert_eq!(earnings.currency, "USD");
    }

    #[test]
    fn total_equals_rounded_sum_of_breakdown() {
        let s = stats(&[("a", 3), ("b", 7), ("c", 1)]);
        let rules = vec![
            rule("a", 0.333, "USD"),
            rule("b", 1.115, "USD"),
            rule("c", 9.999, "USD"),
        ];

        let earnings = calculate_earnings(&s, &rules);
        let expected = round2(earnings.breakdown.values().sum());
        assert_eq!(earnings.total, expected);
    }

    #[test]
    fn missing_stats_default_to_zero() {
        let s = stats(&[("signup", 2)]);
        let rules = vec![rule("signup", 1.0, "USD"), rule("purchase", 50.0, "USD")];

        let earnings = calculate_earnings(&s, &rules);
        assert_eq!(earnings.breakdown.get("purchase"), Some(&0.0));
        assert_eq!(earnings.total, 2.0);
    }

    #[test]
    fn empty_rules_yield_zero_usd() {
        let earnings = calculate_earnings(&stats(&[("signup", 10)]), &[]);
        assert!(earnings.breakdown.is_empty());
        assert_eq!(earnings.total, 0.0);
        assert_eq!(earnings.currency, "USD");
    }

    #[test]
    fn later_rule_overwrites_currency() {
        let s = stats(&[("signup", 1), ("purchase", 1)]);
        let rules = vec![rule("signup", 1.0, "USD"), rule("purchase", 1.0, "EUR")];

        let earnings = calculate_earnings(&s, &rules);
        assert_eq!(earnings.currency, "EUR");
    }

    #[test]
    fn total_earnings_sums_across_codes() {
        let s1 = stats(&[("signup", 5)]);
        let r1 = vec![rule("signup", 2.0, "USD")];
        let s2 = stats(&[("signup", 3), ("purchase", 2)]);
        let r2 = vec![rule("signup", 2.0, "USD"), rule("purchase", 50.0, "USD")];

        let total = calculate_total_earnings([
            (&s1, r1.as_slice()),
            (&s2, r2.as_slice()),
        ])
        .expect("single currency");

        assert_eq!(total.breakdown.get("signup"), Some(&16.0));
        assert_eq!(total.breakdown.get("purchase"), Some(&100.0));
        assert_eq!(total.total, 116.0);
        assert_eq!(total.currency, "USD");
    }

    #[test]
    fn mixed_currencies_fail_fast() {
        let s1 = stats(&[("signup", 1)]);
        let r1 = vec![rule("signup", 2.0, "USD")];
        let s2 = stats(&[("signup", 1)]);
        let r2 = vec![rule("signup", 2.0, "EUR")];

        let err = calculate_total_earnings([
            (&s1, r1.as_slice()),
            (&s2, r2.as_slice()),
        ])
        .expect_err("currencies differ");

        assert!(matches!(err, CoreError::MixedCurrencies { .. }));
    }

    #[test]
    fn rule_free_codes_do_not_pin_currency() {
        let s1 = stats(&[("signup", 4)]);
        let r1: Vec<CommissionRule> = Vec::new();
        let s2 = stats(&[("signup", 1)]);
        let r2 = vec![rule("signup", 2.0, "EUR")];

        let total = calculate_total_earnings([
            (&s1, r1.as_slice()),
            (&s2, r2.as_slice()),
        ])
        .expect("empty code is currency-neutral");

        assert_eq!(total.currency, "EUR");
        assert_eq!(total.total, 2.0);
    }
}
