// ── Event normalization and presentation union ──
//
// Two wire generations coexist in purchase-history payloads: the legacy
// fixed-shape purchase record (`INITIAL_PURCHASE` with `purchased_at_ms`)
// and the dynamic `{ type, date, ... }` activity record. Everything here
// coerces them into `NormalizedEvent` once, at the ingestion boundary,
// so aggregation never sees either raw shape.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use referly_api::models::{RawPurchaseEvent, RawReferredUser};

use crate::convert::{parse_datetime, parse_epoch_ms};
use crate::model::{
    EventMeta, EventSource, EventUnionMap, NormalizedEvent, NormalizedUser, ReferralCode,
};

/// Interpret a JSON value as a timestamp (RFC 3339 string or epoch ms).
fn value_to_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_datetime(s),
        Value::Number(n) => n.as_i64().and_then(parse_epoch_ms),
        _ => None,
    }
}

fn field_datetime(obj: &serde_json::Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    obj.get(key).and_then(value_to_datetime)
}

/// Coerce one raw event record into the canonical shape.
///
/// Legacy `INITIAL_PURCHASE` records are remapped: `period_type ==
/// "TRIAL"` becomes `"free_trial"`, everything else `"purchase"`, with
/// the date taken from `purchased_at_ms`. Dynamic records use their own
/// `type`, with the date falling back from `date` to `purchased_at_ms`
/// to `createdAt`. Records with no usable `type` are dropped with a
/// data-quality warning, never an error.
pub fn normalize_event(raw: &Value) -> Option<NormalizedEvent> {
    let obj = raw.as_object()?;
    let event_type = match obj.get("type").and_then(Value::as_str) {
        Some(t) if !t.is_empty() => t,
        _ => {
            warn!(record = %raw, "event record matches no known shape");
            return None;
        }
    };

    if event_type == "INITIAL_PURCHASE" {
        let period_type = obj.get("period_type").and_then(Value::as_str);
        let mapped = if period_type == Some("TRIAL") {
            "free_trial"
        } else {
            "purchase"
        };
        return Some(NormalizedEvent {
            event_type: mapped.into(),
            source: EventSource::Purchase,
            date: field_datetime(obj, "purchased_at_ms"),
            raw: raw.clone(),
        });
    }

    let date = field_datetime(obj, "date")
        .or_else(|| field_datetime(obj, "purchased_at_ms"))
        .or_else(|| field_datetime(obj, "createdAt"));

    Some(NormalizedEvent {
        event_type: event_type.into(),
        source: EventSource::Activity,
        date,
        raw: raw.clone(),
    })
}

/// Normalize one referred user and their event log.
pub fn normalize_user(raw: &RawReferredUser) -> NormalizedUser {
    NormalizedUser {
        user_id: raw.user_id.clone(),
        referral_created_at: raw.referral_created_at.as_deref().and_then(parse_datetime),
        events: raw.events.iter().filter_map(normalize_event).collect(),
    }
}

/// Parse a purchase-event payload into typed legacy records.
///
/// Some deployments embed the event array as a JSON string; this accepts
/// an array, a string-encoded array, or a single object. Entries without
/// the `type` discriminator fail typed deserialization and are dropped;
/// the other legacy fields are optional.
pub fn parse_purchase_events(payload: &Value) -> Vec<RawPurchaseEvent> {
    let items: Vec<Value> = match payload {
        Value::Array(items) => items.clone(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => items,
            Ok(single @ Value::Object(_)) => vec![single],
            Ok(_) => Vec::new(),
            Err(err) => {
                warn!(%err, "unparseable purchase-event payload");
                Vec::new()
            }
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RawPurchaseEvent>(item).ok())
        .collect()
}

/// Revenue attributable to a set of legacy purchase events.
///
/// Only `INITIAL_PURCHASE` records carry revenue; trial purchases have a
/// zero price so no period-type filter is needed.
pub fn revenue_from_events(events: &[RawPurchaseEvent]) -> f64 {
    events
        .iter()
        .filter(|e| e.event_type == "INITIAL_PURCHASE")
        .map(|e| e.price.unwrap_or(0.0))
        .sum()
}

/// Trial vs. paid conversion counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionCounts {
    pub trial: u64,
    pub paid: u64,
}

pub fn count_conversions(events: &[RawPurchaseEvent]) -> ConversionCounts {
    let mut counts = ConversionCounts::default();
    for event in events {
        if event.event_type == "INITIAL_PURCHASE" {
            match event.period_type.as_deref() {
                Some("TRIAL") => counts.trial += 1,
                Some("NORMAL") => counts.paid += 1,
                _ => {}
            }
        }
    }
    counts
}

/// Fallback display label: `"3_meals_logged"` -> `"3 Meals Logged"`.
pub fn format_event_label(event_type: &str) -> String {
    event_type
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Union event metadata across every code's commission configuration.
///
/// The first explicit `display_name` seen for an event wins; later
/// duplicates never overwrite it. [`format_event_label`] applies only to
/// events that never carry an explicit name anywhere in the data -- an
/// unnamed rule must not mask a named one seen later. An event is
/// monetary when any rule for it has a positive rate.
pub fn build_event_union(codes: &[ReferralCode]) -> EventUnionMap {
    let mut seen: BTreeMap<String, (Option<String>, bool)> = BTreeMap::new();

    for code in codes {
        for rule in &code.commission_config {
            let (name, monetary) = seen.entry(rule.event.clone()).or_insert((None, false));
            if name.is_none() {
                name.clone_from(&rule.display_name);
            }
            if rule.rate > 0.0 {
                *monetary = true;
            }
        }
    }

    seen.into_iter()
        .map(|(event, (name, is_monetary))| {
            let display_name = name.unwrap_or_else(|| format_event_label(&event));
            (event, EventMeta {
                display_name,
                is_monetary,
            })
        })
        .collect()
}

/// Display label for an event, via the union map or the fallback format.
pub fn display_label(union: &EventUnionMap, event_type: &str) -> String {
    union
        .get(event_type)
        .map_or_else(|| format_event_label(event_type), |m| m.display_name.clone())
}
