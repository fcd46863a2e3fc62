// ── Runtime connection configuration ──
//
// These types describe *how* to reach the affiliate backend. They carry
// credential data and connection tuning, but never touch disk -- the
// CLI constructs a `DashboardConfig` from its profile layer and hands
// it in.

use secrecy::SecretString;
use url::Url;

/// How to authenticate with the backend.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// A previously issued session token (from the session cache).
    Token(SecretString),
    /// Email/password login; exchanged for a token on connect.
    Credentials {
        email: String,
        password: SecretString,
    },
}

/// Configuration for one dashboard session.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend base URL (e.g. `https://api.example.com/`).
    pub url: Url,
    /// Authentication method and credentials.
    pub auth: AuthCredentials,
    /// Affiliate scope for data fetches. `"system"` fetches the
    /// system-level codes.
    pub affiliate_user_id: String,
    /// Request timeout.
    pub timeout: std::time::Duration,
    /// How often to perform a full refresh (seconds). 0 = never.
    pub refresh_interval_secs: u64,
    /// Accept invalid TLS certificates (staging backends).
    pub accept_invalid_certs: bool,
}

impl DashboardConfig {
    pub fn new(url: Url, auth: AuthCredentials) -> Self {
        Self {
            url,
            auth,
            affiliate_user_id: "system".into(),
            timeout: std::time::Duration::from_secs(30),
            refresh_interval_secs: 0,
            accept_invalid_certs: false,
        }
    }
}
