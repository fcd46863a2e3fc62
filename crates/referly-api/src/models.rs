// Backend API response types
//
// Models for the affiliate backend's JSON API. Payload-carrying endpoints
// wrap their data in the `ApiResponse<T>` envelope; the auth endpoints
// return a flat body. Fields use `#[serde(default)]` liberally because the
// backend is inconsistent about field presence across deployments.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Response envelope ────────────────────────────────────────────────

/// Standard backend response envelope.
///
/// Every data endpoint wraps its payload:
/// ```json
/// { "message": "ok", "success": true, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub message: Option<String>,
    pub success: bool,
    // No `#[serde(default)]` here: it would put a `T: Default` bound on
    // the derived impl, and an absent field already deserializes to None.
    pub data: Option<T>,
}

// ── Auth ─────────────────────────────────────────────────────────────

/// Body for `POST /affiliate-login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Flat response from `affiliate-login` and `get-affiliate-user`.
///
/// Production deployments may omit the user fields on login and only set a
/// session cookie; callers should follow up with `get-affiliate-user`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

// ── Referral codes ───────────────────────────────────────────────────

/// One commission rule as configured on the backend.
///
/// `event` is a free-form key (`"signup"`, `"purchase"`, `"3_meals_logged"`,
/// ...); new event types appear through configuration only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCommissionRule {
    pub event: String,
    pub rate: f64,
    pub currency: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Per-code counters: a fixed `totalReferrals` plus dynamic event counts
/// spread into the same object (`free_trial`, `purchase`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCodeStats {
    #[serde(default, rename = "totalReferrals")]
    pub total_referrals: u64,
    /// Dynamic event counters, keyed by event type.
    #[serde(flatten)]
    pub events: BTreeMap<String, u64>,
}

/// Referral code record from `get-affiliate-referral-codes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReferralCode {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub quota: Option<u64>,
    #[serde(default, rename = "noOfDays")]
    pub no_of_days: Option<u32>,
    #[serde(default, rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(default, rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, rename = "commissionConfig")]
    pub commission_config: Vec<RawCommissionRule>,
    #[serde(default)]
    pub stats: RawCodeStats,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Purchase history ─────────────────────────────────────────────────

/// One referred user with their raw event log.
///
/// `events` stays untyped here: each entry is either a legacy fixed-shape
/// purchase event or a dynamic `{ type, date, ... }` record. referly-core
/// normalizes them at the ingestion boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReferredUser {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, rename = "referralCreatedAt")]
    pub referral_created_at: Option<String>,
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Per-code group from `get-affiliate-purchase-history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPurchaseHistoryGroup {
    #[serde(rename = "referralCode")]
    pub referral_code: String,
    #[serde(default, rename = "commissionConfig")]
    pub commission_config: Vec<RawCommissionRule>,
    #[serde(default)]
    pub stats: RawCodeStats,
    #[serde(default)]
    pub users: Vec<RawReferredUser>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Legacy fixed-shape purchase event (RevenueCat-style webhook record).
///
/// Only the fields the pipeline reads are modeled; the rest lands in
/// `extra`. Typed deserialization requires the `type` discriminator --
/// the remaining fields are optional, since real records vary widely
/// across deployments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPurchaseEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub period_type: Option<String>,
    #[serde(default)]
    pub purchased_at_ms: Option<i64>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // RawReferralCode has no Default impl, so this only compiles while the
    // derived Deserialize for ApiResponse<T> carries no T: Default bound.
    #[test]
    fn envelope_deserializes_without_default_payload() {
        let body = r#"{ "success": true, "data": [{ "id": "rc-1", "code": "SPRING24" }] }"#;
        let envelope: ApiResponse<Vec<RawReferralCode>> = serde_json::from_str(body).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.data.unwrap()[0].code, "SPRING24");
    }

    #[test]
    fn envelope_with_absent_data_is_none() {
        let body = r#"{ "success": false, "message": "nope" }"#;
        let envelope: ApiResponse<Vec<RawReferralCode>> = serde_json::from_str(body).unwrap();
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message.as_deref(), Some("nope"));
    }
}
