// Integration tests for `AffiliateClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use referly_api::transport::TransportConfig;
use referly_api::{AffiliateClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, AffiliateClient) {
    let server = MockServer::start().await;
    let url = format!("{}/", server.uri()).parse().expect("mock server URL");
    let client = AffiliateClient::new(url, &TransportConfig::default()).expect("client builds");
    (server, client)
}

fn envelope(data: serde_json::Value) -> serde_json::Value {
    json!({ "message": "ok", "success": true, "data": data })
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn referral_codes_unwraps_envelope() {
    let (server, client) = setup().await;

    let body = envelope(json!([
        {
            "id": "rc-1",
            "code": "SPRING24",
            "quota": 100,
            "noOfDays": 30,
            "startDate": "2024-01-01T00:00:00Z",
            "endDate": null,
            "createdAt": "2024-01-01T00:00:00Z",
            "commissionConfig": [
                { "event": "signup", "rate": 2.0, "currency": "USD" },
                { "event": "purchase", "rate": 50.0, "currency": "USD",
                  "display_name": "Purchase" },
            ],
            "stats": { "totalReferrals": 5, "signup": 5, "purchase": 2 }
        }
    ]));

    Mock::given(method("GET"))
        .and(path("/get-affiliate-referral-codes"))
        .and(query_param("affiliateUserId", "system"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let codes = client.referral_codes("system").await.expect("codes fetch");

    assert_eq!(codes.len(), 1);
    assert_eq!(codes[0].code, "SPRING24");
    assert_eq!(codes[0].quota, Some(100));
    assert_eq!(codes[0].no_of_days, Some(30));
    assert_eq!(codes[0].stats.total_referrals, 5);
    assert_eq!(codes[0].stats.events.get("purchase"), Some(&2));
    assert_eq!(codes[0].commission_config.len(), 2);
    assert_eq!(
        codes[0].commission_config[1].display_name.as_deref(),
        Some("Purchase")
    );
}

#[tokio::test]
async fn purchase_history_passes_optional_filters() {
    let (server, client) = setup().await;

    let body = envelope(json!([
        {
            "referralCode": "SPRING24",
            "commissionConfig": [],
            "stats": { "totalReferrals": 1 },
            "users": [
                {
                    "userId": "u-1",
                    "referralCreatedAt": "2024-01-15T10:00:00Z",
                    "events": [
                        { "type": "INITIAL_PURCHASE", "period_type": "TRIAL",
                          "purchased_at_ms": 1705312800000i64 }
                    ]
                }
            ]
        }
    ]));

    Mock::given(method("GET"))
        .and(path("/get-affiliate-purchase-history"))
        .and(query_param("affiliateUserId", "system"))
        .and(query_param("referralCode", "SPRING24"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let groups = client
        .purchase_history("system", Some("SPRING24"), None)
        .await
        .expect("history fetch");

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].users.len(), 1);
    assert_eq!(
        groups[0].users[0].referral_created_at.as_deref(),
        Some("2024-01-15T10:00:00Z")
    );
    assert_eq!(groups[0].users[0].events.len(), 1);
}

#[tokio::test]
async fn login_returns_identity() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/affiliate-login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "name": "Ada",
            "email": "ada@example.com",
            "role": "admin",
            "token": "tok-123"
        })))
        .mount(&server)
        .await;

    let auth = client.login("ada@example.com", "hunter2").await.expect("login");
    assert_eq!(auth.name.as_deref(), Some("Ada"));
    assert_eq!(auth.role.as_deref(), Some("admin"));
    assert_eq!(auth.token.as_deref(), Some("tok-123"));
}

// ── Error-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn envelope_failure_surfaces_backend_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get-affiliate-referral-codes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "affiliate not found",
            "success": false,
            "data": null
        })))
        .mount(&server)
        .await;

    let err = client.referral_codes("nobody").await.expect_err("must fail");
    match err {
        Error::Api { message, .. } => assert_eq!(message, "affiliate not found"),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_maps_to_session_expired() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get-affiliate-referral-codes"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.referral_codes("system").await.expect_err("must fail");
    assert!(matches!(err, Error::SessionExpired));
    assert!(err.is_auth_expired());
}

#[tokio::test]
async fn rejected_login_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/affiliate-login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "bad credentials"
        })))
        .mount(&server)
        .await;

    let err = client
        .login("ada@example.com", "wrong")
        .await
        .expect_err("must fail");
    match err {
        Error::Authentication { message } => assert_eq!(message, "bad credentials"),
        other => panic!("expected Authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get-affiliate-referral-codes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.referral_codes("system").await.expect_err("must fail");
    assert!(matches!(err, Error::Deserialization { .. }));
}
