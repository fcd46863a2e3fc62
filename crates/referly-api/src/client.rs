// Affiliate backend HTTP client
//
// Wraps `reqwest::Client` with backend-specific URL construction and
// envelope unwrapping. All data methods return unwrapped `data` payloads --
// the `{ message, success, data }` envelope is stripped before the caller
// sees it.

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{
    ApiResponse, AuthResponse, LoginRequest, RawPurchaseHistoryGroup, RawReferralCode,
};
use crate::transport::TransportConfig;

/// Raw HTTP client for the affiliate backend API.
///
/// Handles the response envelope and query construction. Authentication is
/// a bearer token injected as a default header at build time; an
/// unauthenticated client can only call [`login`](Self::login).
pub struct AffiliateClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AffiliateClient {
    /// Create an unauthenticated client (login only).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client that authenticates every request with a session token.
    pub fn with_token(
        base_url: Url,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client_with_token(token)?;
        Ok(Self { http, base_url })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Auth endpoints ───────────────────────────────────────────────

    /// `POST /affiliate-login` -- exchange credentials for a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, Error> {
        let url = self.api_url("affiliate-login")?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(Error::Transport)?;

        let auth = Self::parse_flat::<AuthResponse>(resp).await?;
        if auth.success {
            Ok(auth)
        } else {
            Err(Error::Authentication {
                message: auth.message.unwrap_or_else(|| "login rejected".into()),
            })
        }
    }

    /// `GET /get-affiliate-user` -- verify the session and fetch identity.
    pub async fn current_user(&self) -> Result<AuthResponse, Error> {
        let url = self.api_url("get-affiliate-user")?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::parse_flat(resp).await
    }

    // ── Data endpoints ───────────────────────────────────────────────

    /// `GET /get-affiliate-referral-codes?affiliateUserId=...`
    pub async fn referral_codes(
        &self,
        affiliate_user_id: &str,
    ) -> Result<Vec<RawReferralCode>, Error> {
        let mut url = self.api_url("get-affiliate-referral-codes")?;
        url.query_pairs_mut()
            .append_pair("affiliateUserId", affiliate_user_id);
        self.get(url).await
    }

    /// `GET /get-affiliate-purchase-history?affiliateUserId=...`
    ///
    /// Optional `referral_code` / `user_id` narrow the result to one code
    /// or one referred user.
    pub async fn purchase_history(
        &self,
        affiliate_user_id: &str,
        referral_code: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<Vec<RawPurchaseHistoryGroup>, Error> {
        let mut url = self.api_url("get-affiliate-purchase-history")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("affiliateUserId", affiliate_user_id);
            if let Some(code) = referral_code {
                pairs.append_pair("referralCode", code);
            }
            if let Some(uid) = user_id {
                pairs.append_pair("userId", uid);
            }
        }
        self.get(url).await
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the backend envelope.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::parse_envelope(resp).await
    }

    /// Parse the `{ message, success, data }` envelope, returning `data` on
    /// success or an `Error::Api` if `success` is false or `data` missing.
    async fn parse_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Api {
                message: body,
                status: status.as_u16(),
            });
        }

        let envelope: ApiResponse<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        if !envelope.success {
            return Err(Error::Api {
                message: envelope
                    .message
                    .unwrap_or_else(|| "backend reported failure".into()),
                status: status.as_u16(),
            });
        }

        envelope.data.ok_or_else(|| Error::Api {
            message: "successful response carried no data".into(),
            status: status.as_u16(),
        })
    }

    /// Parse a flat (non-enveloped) body, as the auth endpoints return.
    async fn parse_flat<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Api {
                message: body,
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
