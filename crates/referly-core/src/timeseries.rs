// ── Daily time-series builder ──
//
// Reconstructs a contiguous, zero-filled daily series of event counts
// from normalized per-user event logs. `today` is always a parameter so
// range resolution stays deterministic under test.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::model::{NormalizedUser, TimeSeriesPoint};

/// Inclusive calendar-day range for a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Number of calendar days covered, inclusive.
    pub fn len_days(&self) -> u64 {
        u64::try_from((self.end - self.start).num_days().max(0)).unwrap_or(0) + 1
    }
}

fn earliest_signup(users: &[NormalizedUser]) -> Option<DateTime<Utc>> {
    users.iter().filter_map(|u| u.referral_created_at).min()
}

fn earliest_event(users: &[NormalizedUser]) -> Option<DateTime<Utc>> {
    users
        .iter()
        .flat_map(|u| u.events.iter().filter_map(|e| e.date))
        .min()
}

/// Resolve the series range from explicit bounds and the data itself.
///
/// The start is the first of: explicit start, earliest signup timestamp,
/// earliest event timestamp, 29 days before `today` (a 30-day default
/// window). The end defaults to `today`. A start after the end collapses
/// the range to a single day at the end.
pub fn resolve_date_range(
    users: &[NormalizedUser],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> DateRange {
    let end = end.unwrap_or(today);
    let start = start
        .or_else(|| earliest_signup(users).map(|dt| dt.date_naive()))
        .or_else(|| earliest_event(users).map(|dt| dt.date_naive()))
        .unwrap_or_else(|| today.checked_sub_days(Days::new(29)).unwrap_or(today));
    DateRange {
        start: start.min(end),
        end,
    }
}

/// Build one zero-filled point per day in `range`, then count signups and
/// conversion events into the matching days.
///
/// Signups come strictly from `referral_created_at`; a user lacking it
/// contributes no signup regardless of other events. Events on days
/// outside `range` are not dropped -- their days are added, so the output
/// may extend past the requested bounds. The result is sorted ascending
/// with no duplicate dates.
pub fn build_time_series(users: &[NormalizedUser], range: DateRange) -> Vec<TimeSeriesPoint> {
    let mut days: BTreeMap<NaiveDate, TimeSeriesPoint> = BTreeMap::new();

    let mut day = range.start;
    while day <= range.end {
        days.insert(day, TimeSeriesPoint::empty(day));
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }

    for user in users {
        if let Some(signed_up) = user.referral_created_at {
            let date = signed_up.date_naive();
            let point = days.entry(date).or_insert_with(|| TimeSeriesPoint::empty(date));
            *point.event_counts.entry("signup".into()).or_insert(0) += 1;
        }
    }

    for user in users {
        for event in &user.events {
            let Some(timestamp) = event.date else { continue };
            let date = timestamp.date_naive();
            let point = days.entry(date).or_insert_with(|| TimeSeriesPoint::empty(date));
            *point
                .event_counts
                .entry(event.event_type.clone())
                .or_insert(0) += 1;
        }
    }

    days.into_values().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::events::normalize_event;
    use crate::model::{EventSource, NormalizedEvent};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn user(signup: Option<&str>, events: Vec<NormalizedEvent>) -> NormalizedUser {
        NormalizedUser {
            user_id: "u".into(),
            referral_created_at: signup
                .map(|s| DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)),
            events,
        }
    }

    fn activity(event_type: &str, date: &str) -> NormalizedEvent {
        NormalizedEvent {
            event_type: event_type.into(),
            source: EventSource::Activity,
            date: Some(DateTime::parse_from_rfc3339(date).unwrap().with_timezone(&Utc)),
            raw: json!({}),
        }
    }

    #[test]
    fn zero_filled_inclusive_range() {
        let range = DateRange {
            start: date(2024, 1, 1),
            end: date(2024, 1, 10),
        };
        let series = build_time_series(&[], range);

        assert_eq!(series.len(), 10);
        assert_eq!(series.len() as u64, range.len_days());
        assert_eq!(series.first().unwrap().date, date(2024, 1, 1));
        assert_eq!(series.last().unwrap().date, date(2024, 1, 10));
        assert!(series.iter().all(|p| p.event_counts.is_empty()));
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn signup_counted_on_referral_creation_day_only() {
        let users = vec![user(Some("2024-01-15T10:00:00Z"), vec![])];
        let range = DateRange {
            start: date(2024, 1, 14),
            end: date(2024, 1, 16),
        };
        let series = build_time_series(&users, range);

        assert_eq!(series.len(), 3);
        assert_eq!(series[1].date, date(2024, 1, 15));
        assert_eq!(series[1].count("signup"), 1);
        assert_eq!(series[0].count("signup"), 0);
        assert_eq!(series[2].count("signup"), 0);
    }

    #[test]
    fn signup_requires_referral_timestamp() {
        let users = vec![user(None, vec![activity("purchase", "2024-01-15T00:00:00Z")])];
        let range = DateRange {
            start: date(2024, 1, 15),
            end: date(2024, 1, 15),
        };
        let series = build_time_series(&users, range);
        assert_eq!(series[0].count("signup"), 0);
        assert_eq!(series[0].count("purchase"), 1);
    }

    #[test]
    fn legacy_trial_event_lands_as_free_trial() {
        // 2024-01-15T08:30:00Z
        let raw = json!({
            "type": "INITIAL_PURCHASE",
            "period_type": "TRIAL",
            "purchased_at_ms": 1_705_307_400_000_i64,
        });
        let users = vec![user(None, vec![normalize_event(&raw).unwrap()])];
        let range = DateRange {
            start: date(2024, 1, 15),
            end: date(2024, 1, 15),
        };
        let series = build_time_series(&users, range);
        assert_eq!(series[0].count("free_trial"), 1);
    }

    #[test]
    fn out_of_range_events_extend_the_series() {
        let users = vec![user(None, vec![activity("purchase", "2024-02-01T00:00:00Z")])];
        let range = DateRange {
            start: date(2024, 1, 1),
            end: date(2024, 1, 3),
        };
        let series = build_time_series(&users, range);

        assert_eq!(series.len(), 4);
        assert_eq!(series.last().unwrap().date, date(2024, 2, 1));
        assert_eq!(series.last().unwrap().count("purchase"), 1);
    }

    #[test]
    fn dateless_events_are_skipped() {
        let mut event = activity("streak", "2024-01-15T00:00:00Z");
        event.date = None;
        let users = vec![user(None, vec![event])];
        let range = DateRange {
            start: date(2024, 1, 15),
            end: date(2024, 1, 15),
        };
        let series = build_time_series(&users, range);
        assert_eq!(series[0].count("streak"), 0);
    }

    #[test]
    fn range_prefers_explicit_start() {
        let users = vec![user(Some("2024-01-01T00:00:00Z"), vec![])];
        let range = resolve_date_range(&users, Some(date(2024, 2, 1)), None, date(2024, 3, 1));
        assert_eq!(range.start, date(2024, 2, 1));
        assert_eq!(range.end, date(2024, 3, 1));
    }

    #[test]
    fn range_falls_back_to_earliest_signup_then_event() {
        let signup_users = vec![
            user(Some("2024-01-10T00:00:00Z"), vec![]),
            user(Some("2024-01-05T00:00:00Z"), vec![]),
        ];
        let range = resolve_date_range(&signup_users, None, None, date(2024, 3, 1));
        assert_eq!(range.start, date(2024, 1, 5));

        let event_users = vec![user(None, vec![activity("purchase", "2024-01-20T00:00:00Z")])];
        let range = resolve_date_range(&event_users, None, None, date(2024, 3, 1));
        assert_eq!(range.start, date(2024, 1, 20));
    }

    #[test]
    fn empty_data_defaults_to_thirty_day_window() {
        let today = date(2024, 3, 1);
        let range = resolve_date_range(&[], None, None, today);
        assert_eq!(range.end, today);
        assert_eq!(range.start, date(2024, 2, 1));
        assert_eq!(range.len_days(), 30);
    }

    #[test]
    fn start_after_end_collapses_to_end() {
        let range = resolve_date_range(&[], Some(date(2024, 5, 1)), Some(date(2024, 4, 1)), date(2024, 6, 1));
        assert_eq!(range.start, date(2024, 4, 1));
        assert_eq!(range.end, date(2024, 4, 1));
        assert_eq!(range.len_days(), 1);
    }
}
