// ── Dashboard lifecycle ──
//
// Full lifecycle management for an affiliate dashboard session:
// authentication, data refresh, optional background polling, and
// reactive state through the DataStore.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use referly_api::transport::{TlsMode, TransportConfig};
use referly_api::{AffiliateClient, models::AuthResponse};

use crate::config::{AuthCredentials, DashboardConfig};
use crate::error::CoreError;
use crate::events::{build_event_union, normalize_user};
use crate::model::{DashboardStats, NormalizedUser, ReferralCode};
use crate::store::DataStore;
use crate::timeseries::{build_time_series, resolve_date_range};

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// Identity of the authenticated affiliate.
#[derive(Debug, Clone)]
pub struct AffiliateIdentity {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    /// Session token, present after a credential login.
    pub token: Option<SecretString>,
}

impl From<AuthResponse> for AffiliateIdentity {
    fn from(auth: AuthResponse) -> Self {
        Self {
            name: auth.name,
            email: auth.email,
            role: auth.role,
            token: auth.token.map(SecretString::from),
        }
    }
}

// ── Dashboard ────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc`. Owns the API client, the reactive
/// [`DataStore`], and the optional background refresh task.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    store: Arc<DataStore>,
    connection_state: watch::Sender<ConnectionState>,
    client: Mutex<Option<AffiliateClient>>,
    identity: Mutex<Option<AffiliateIdentity>>,
    cancel: CancellationToken,
    /// Child token for the current session -- cancelled on disconnect,
    /// replaced on reconnect.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Dashboard {
    /// Create a new Dashboard from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to authenticate and start
    /// background tasks.
    pub fn new(config: DashboardConfig) -> Self {
        let store = Arc::new(DataStore::new());
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(DashboardInner {
                config,
                store,
                connection_state,
                client: Mutex::new(None),
                identity: Mutex::new(None),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the dashboard configuration.
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    /// Access the underlying DataStore.
    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    /// Subscribe to connection state changes.
    pub fn subscribe_connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Identity of the authenticated affiliate, if connected.
    pub async fn identity(&self) -> Option<AffiliateIdentity> {
        self.inner.identity.lock().await.clone()
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the backend.
    ///
    /// Authenticates (exchanging credentials for a token if needed),
    /// verifies the session, performs an initial refresh, and spawns the
    /// periodic refresh task when configured.
    pub async fn connect(&self) -> Result<(), CoreError> {
        // send_replace throughout: state transitions must not depend on a
        // receiver being subscribed at the time of the send.
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        // Fresh child token for this session (supports reconnect).
        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        match self.authenticate().await {
            Ok(()) => {}
            Err(e) => {
                self.inner
                    .connection_state
                    .send_replace(ConnectionState::Failed);
                return Err(e);
            }
        }

        // Initial data load
        self.refresh().await?;

        let interval_secs = self.inner.config.refresh_interval_secs;
        if interval_secs > 0 {
            let dashboard = self.clone();
            let cancel = child;
            self.inner
                .task_handles
                .lock()
                .await
                .push(tokio::spawn(refresh_task(dashboard, interval_secs, cancel)));
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Connected);
        info!("connected to affiliate backend");
        Ok(())
    }

    /// Authenticate per the configured credential mode and install the
    /// authenticated client and identity.
    async fn authenticate(&self) -> Result<(), CoreError> {
        let config = &self.inner.config;
        let transport = build_transport(config);

        let (client, identity) = match &config.auth {
            AuthCredentials::Token(token) => {
                let client =
                    AffiliateClient::with_token(config.url.clone(), token, &transport)?;
                // Verify the cached token before trusting it.
                let user = client.current_user().await?;
                debug!("session token verified");
                (client, AffiliateIdentity::from(user))
            }
            AuthCredentials::Credentials { email, password } => {
                let login_client = AffiliateClient::new(config.url.clone(), &transport)?;
                let auth = login_client
                    .login(email, password.expose_secret())
                    .await?;
                debug!("credential login successful");

                let identity = AffiliateIdentity::from(auth);
                let client = match &identity.token {
                    Some(token) => {
                        AffiliateClient::with_token(config.url.clone(), token, &transport)?
                    }
                    // Some deployments only set a session cookie on login;
                    // the bare client keeps working through it.
                    None => login_client,
                };
                (client, identity)
            }
        };

        *self.inner.client.lock().await = Some(client);
        *self.inner.identity.lock().await = Some(identity);
        Ok(())
    }

    /// Disconnect: cancel background tasks and drop the session.
    pub async fn disconnect(&self) {
        // Cancel the child token (not the parent -- allows reconnect).
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        *self.inner.client.lock().await = None;
        *self.inner.identity.lock().await = None;

        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Fetch everything and update the DataStore.
    ///
    /// Referral codes and purchase history are fetched concurrently. A
    /// codes failure fails the whole refresh; a history failure degrades
    /// to an empty time series with a warning, matching the view that
    /// code data is primary and the chart is supplementary. Both applies
    /// carry this refresh's generation, so results from an older
    /// concurrent refresh can never overwrite these.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let client_guard = self.inner.client.lock().await;
        let client = client_guard.as_ref().ok_or(CoreError::NotAuthenticated)?;

        let generation = self.inner.store.begin_refresh();
        let affiliate_user_id = self.inner.config.affiliate_user_id.as_str();

        let (codes_res, history_res) = tokio::join!(
            client.referral_codes(affiliate_user_id),
            client.purchase_history(affiliate_user_id, None, None),
        );

        let now = chrono::Utc::now();
        let codes: Vec<ReferralCode> = codes_res?
            .into_iter()
            .map(|raw| ReferralCode::from_raw(raw, now))
            .collect();
        let stats = DashboardStats::aggregate(&codes)?;
        let event_union = build_event_union(&codes);
        debug!(
            codes = codes.len(),
            events = event_union.len(),
            "referral codes refreshed"
        );
        self.inner
            .store
            .apply_codes(generation, codes, stats, event_union);

        let users: Vec<NormalizedUser> = match history_res {
            Ok(groups) => groups
                .iter()
                .flat_map(|group| group.users.iter().map(normalize_user))
                .collect(),
            Err(e) => {
                warn!(error = %e, "purchase history fetch failed; time series will be empty");
                Vec::new()
            }
        };
        let range = resolve_date_range(&users, None, None, now.date_naive());
        let series = build_time_series(&users, range);
        self.inner.store.apply_series(generation, series);

        Ok(())
    }

    /// Rebuild the time series over an explicitly bounded range.
    ///
    /// Fetches fresh purchase history, resolves the range with the given
    /// bounds taking precedence over the data-derived fallbacks, and
    /// applies the result to the store as well as returning it.
    pub async fn series_with_range(
        &self,
        start: Option<chrono::NaiveDate>,
        end: Option<chrono::NaiveDate>,
    ) -> Result<Vec<crate::model::TimeSeriesPoint>, CoreError> {
        let client_guard = self.inner.client.lock().await;
        let client = client_guard.as_ref().ok_or(CoreError::NotAuthenticated)?;

        let generation = self.inner.store.begin_refresh();
        let groups = client
            .purchase_history(self.inner.config.affiliate_user_id.as_str(), None, None)
            .await?;
        let users: Vec<NormalizedUser> = groups
            .iter()
            .flat_map(|group| group.users.iter().map(normalize_user))
            .collect();

        let range = resolve_date_range(&users, start, end, chrono::Utc::now().date_naive());
        let series = build_time_series(&users, range);
        self.inner.store.apply_series(generation, series.clone());
        Ok(series)
    }
}

fn build_transport(config: &DashboardConfig) -> TransportConfig {
    TransportConfig {
        tls: if config.accept_invalid_certs {
            TlsMode::DangerAcceptInvalid
        } else {
            TlsMode::System
        },
        timeout: config.timeout,
    }
}

/// Periodically refresh data from the backend.
async fn refresh_task(dashboard: Dashboard, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = dashboard.refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}
