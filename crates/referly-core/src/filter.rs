// ── Filter / sort engine ──
//
// Case-insensitive substring filtering and stable multi-key sorting over
// the referral-code collection. Sort keys include derived quantities
// (signup count, total conversions, earnings total) that are not flat
// fields on the entity.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::model::ReferralCode;

/// Fields the substring filter can match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum FilterKey {
    Code,
    Id,
    Status,
}

/// Columns the table can sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    Code,
    Status,
    CreatedAt,
    /// Derived: the `signup` counter inside `event_stats`.
    Signups,
    /// Derived: sum of all `event_stats` counters.
    TotalConversions,
    /// Derived: the earnings breakdown's `total` field.
    Earnings,
    TotalReferrals,
    Quota,
    StartDate,
    EndDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Active sort state for the code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }

    /// Re-selecting the current key reverses the direction; selecting a
    /// new key resets to ascending.
    #[must_use]
    pub fn toggle(self, key: SortKey) -> Self {
        if key == self.key {
            Self {
                key,
                direction: match self.direction {
                    SortDirection::Ascending => SortDirection::Descending,
                    SortDirection::Descending => SortDirection::Ascending,
                },
            }
        } else {
            Self::new(key)
        }
    }
}

/// A sortable projection of one column value.
#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Number(f64),
    Text(String),
    Missing,
}

#[allow(clippy::cast_precision_loss)]
fn sort_value(code: &ReferralCode, key: SortKey) -> SortValue {
    match key {
        SortKey::Code => SortValue::Text(code.code.clone()),
        SortKey::Status => SortValue::Text(code.status.to_string()),
        SortKey::CreatedAt => SortValue::Number(code.created_at.timestamp_millis() as f64),
        SortKey::Signups => SortValue::Number(code.signups() as f64),
        SortKey::TotalConversions => SortValue::Number(code.total_conversions() as f64),
        SortKey::Earnings => SortValue::Number(code.earnings.total),
        SortKey::TotalReferrals => SortValue::Number(code.total_referrals as f64),
        SortKey::Quota => code
            .quota
            .map_or(SortValue::Missing, |q| SortValue::Number(q as f64)),
        SortKey::StartDate => code.start_date.map_or(SortValue::Missing, |d| {
            SortValue::Number(d.timestamp_millis() as f64)
        }),
        SortKey::EndDate => code.end_date.map_or(SortValue::Missing, |d| {
            SortValue::Number(d.timestamp_millis() as f64)
        }),
    }
}

fn compare_values(a: &SortValue, b: &SortValue, direction: SortDirection) -> Ordering {
    // Missing values sort last regardless of direction.
    let ordering = match (a, b) {
        (SortValue::Missing, SortValue::Missing) => return Ordering::Equal,
        (SortValue::Missing, _) => return Ordering::Greater,
        (_, SortValue::Missing) => return Ordering::Less,
        (SortValue::Number(x), SortValue::Number(y)) => x.total_cmp(y),
        (SortValue::Text(x), SortValue::Text(y)) => x.cmp(y),
        (SortValue::Number(x), SortValue::Text(y)) => x.to_string().cmp(y),
        (SortValue::Text(x), SortValue::Number(y)) => x.cmp(&y.to_string()),
    };
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

fn filter_field(code: &ReferralCode, key: FilterKey) -> String {
    match key {
        FilterKey::Code => code.code.clone(),
        FilterKey::Id => code.id.clone(),
        FilterKey::Status => code.status.to_string(),
    }
}

/// Case-insensitive substring filter over the given keys.
///
/// A blank term (after trimming) matches everything; otherwise a code
/// matches when any selected field contains the term.
pub fn filter_codes(codes: &[ReferralCode], term: &str, keys: &[FilterKey]) -> Vec<ReferralCode> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return codes.to_vec();
    }
    codes
        .iter()
        .filter(|code| {
            keys.iter()
                .any(|key| filter_field(code, *key).to_lowercase().contains(&term))
        })
        .cloned()
        .collect()
}

/// Stable in-place sort by the configured key and direction.
pub fn sort_codes(codes: &mut [ReferralCode], config: SortConfig) {
    codes.sort_by(|a, b| {
        compare_values(
            &sort_value(a, config.key),
            &sort_value(b, config.key),
            config.direction,
        )
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::model::{EarningsBreakdown, ReferralStatus};

    use super::*;

    fn code(name: &str, signups: u64, purchases: u64, quota: Option<u64>) -> ReferralCode {
        ReferralCode {
            id: format!("id-{name}"),
            code: name.into(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            status: ReferralStatus::Active,
            commission_config: vec![],
            quota,
            start_date: None,
            end_date: None,
            duration_days: None,
            event_stats: [
                ("signup".to_owned(), signups),
                ("purchase".to_owned(), purchases),
            ]
            .into_iter()
            .collect(),
            total_referrals: signups,
            earnings: EarningsBreakdown::default(),
        }
    }

    fn names(codes: &[ReferralCode]) -> Vec<&str> {
        codes.iter().map(|c| c.code.as_str()).collect()
    }

    #[test]
    fn blank_term_returns_everything() {
        let codes = vec![code("ALPHA", 1, 0, None), code("BETA", 2, 0, None)];
        let filtered = filter_codes(&codes, "   ", &[FilterKey::Code]);
        assert_eq!(names(&filtered), names(&codes));
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let codes = vec![
            code("SPRING24", 1, 0, None),
            code("SUMMER24", 2, 0, None),
            code("spring-vip", 3, 0, None),
        ];
        let filtered = filter_codes(&codes, "spring", &[FilterKey::Code]);
        assert_eq!(names(&filtered), vec!["SPRING24", "spring-vip"]);
    }

    #[test]
    fn filter_matches_any_selected_key() {
        let mut a = code("ALPHA", 1, 0, None);
        a.status = ReferralStatus::Exhausted;
        let codes = vec![a, code("BETA", 2, 0, None)];

        let by_status = filter_codes(&codes, "exhaust", &[FilterKey::Code, FilterKey::Status]);
        assert_eq!(names(&by_status), vec!["ALPHA"]);

        let code_only = filter_codes(&codes, "exhaust", &[FilterKey::Code]);
        assert!(code_only.is_empty());
    }

    #[test]
    fn sorts_by_derived_signups_and_conversions() {
        let mut codes = vec![
            code("A", 5, 1, None),
            code("B", 1, 9, None),
            code("C", 3, 0, None),
        ];

        sort_codes(&mut codes, SortConfig::new(SortKey::Signups));
        assert_eq!(names(&codes), vec!["B", "C", "A"]);

        sort_codes(&mut codes, SortConfig::new(SortKey::TotalConversions));
        assert_eq!(names(&codes), vec!["C", "A", "B"]);
    }

    #[test]
    fn earnings_sort_unwraps_the_total() {
        let mut a = code("A", 0, 0, None);
        a.earnings.total = 50.0;
        let mut b = code("B", 0, 0, None);
        b.earnings.total = 10.0;
        let mut codes = vec![a, b];

        sort_codes(&mut codes, SortConfig::new(SortKey::Earnings));
        assert_eq!(names(&codes), vec!["B", "A"]);
    }

    #[test]
    fn missing_values_sort_last_in_both_directions() {
        let mut codes = vec![
            code("NOQUOTA", 0, 0, None),
            code("BIG", 0, 0, Some(100)),
            code("SMALL", 0, 0, Some(5)),
        ];

        sort_codes(&mut codes, SortConfig::new(SortKey::Quota));
        assert_eq!(names(&codes), vec!["SMALL", "BIG", "NOQUOTA"]);

        sort_codes(
            &mut codes,
            SortConfig {
                key: SortKey::Quota,
                direction: SortDirection::Descending,
            },
        );
        assert_eq!(names(&codes), vec!["BIG", "SMALL", "NOQUOTA"]);
    }

    #[test]
    fn descending_reverses_ascending_for_tie_free_data() {
        let mut codes = vec![code("B", 2, 0, None), code("A", 1, 0, None), code("C", 3, 0, None)];

        sort_codes(&mut codes, SortConfig::new(SortKey::Code));
        let ascending: Vec<String> = codes.iter().map(|c| c.code.clone()).collect();

        sort_codes(
            &mut codes,
            SortConfig {
                key: SortKey::Code,
                direction: SortDirection::Descending,
            },
        );
        let mut descending: Vec<String> = codes.iter().map(|c| c.code.clone()).collect();
        descending.reverse();
        assert_eq!(ascending, descending);
    }

    #[test]
    fn toggle_flips_same_key_and_resets_new_key() {
        let config = SortConfig::new(SortKey::Code);
        let flipped = config.toggle(SortKey::Code);
        assert_eq!(flipped.direction, SortDirection::Descending);
        assert_eq!(flipped.toggle(SortKey::Code).direction, SortDirection::Ascending);

        let switched = flipped.toggle(SortKey::Earnings);
        assert_eq!(switched.key, SortKey::Earnings);
        assert_eq!(switched.direction, SortDirection::Ascending);
    }

    #[test]
    fn sort_keys_parse_from_kebab_case() {
        assert_eq!("total-conversions".parse(), Ok(SortKey::TotalConversions));
        assert_eq!("created-at".parse(), Ok(SortKey::CreatedAt));
        assert_eq!(SortKey::TotalReferrals.to_string(), "total-referrals");
    }
}
