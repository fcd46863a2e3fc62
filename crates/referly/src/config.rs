//! Resolves CLI flags, config profiles, and the session cache into a
//! connected [`Dashboard`].

use std::time::Duration;

use referly_config::{
    Config, Profile, clear_session, config_path, load_config_from, load_session,
    profile_to_dashboard_config,
};
use referly_core::{AuthCredentials, CoreError, Dashboard, DashboardConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Build the dashboard configuration from (in precedence order) explicit
/// flags, the named or default profile, and the cached session.
pub fn resolve_dashboard_config(global: &GlobalOpts) -> Result<DashboardConfig, CliError> {
    let session = load_session()?;

    let mut config = match &global.backend {
        // --backend bypasses the config file entirely; credentials come
        // from the session cache or REFERLY_EMAIL / REFERLY_PASSWORD.
        Some(backend) => {
            let profile = Profile {
                backend: backend.clone(),
                affiliate_user_id: "system".into(),
                ..Profile::default()
            };
            profile_to_dashboard_config(&profile, "<ad-hoc>", session.as_ref())?
        }
        None => {
            let path = config_path();
            if !path.exists() && session.is_none() {
                return Err(CliError::NoConfig {
                    path: path.display().to_string(),
                });
            }
            let file_config: Config = load_config_from(&path)?;
            let (name, profile) = file_config
                .profile(global.profile.as_deref())
                .map_err(|e| {
                    if path.exists() || global.profile.is_some() {
                        CliError::from(e)
                    } else {
                        CliError::NoConfig {
                            path: path.display().to_string(),
                        }
                    }
                })?;
            profile_to_dashboard_config(profile, name, session.as_ref())?
        }
    };

    if let Some(affiliate) = &global.affiliate {
        config.affiliate_user_id = affiliate.clone();
    }
    if global.insecure {
        config.accept_invalid_certs = true;
    }
    config.timeout = Duration::from_secs(global.timeout);
    // One-shot CLI invocations never want background polling.
    config.refresh_interval_secs = 0;

    Ok(config)
}

/// Resolve the backend URL and any profile-configured email for a login,
/// without requiring stored credentials.
pub fn resolve_login_target(global: &GlobalOpts) -> Result<(url::Url, Option<String>), CliError> {
    let (backend, email) = match &global.backend {
        Some(backend) => (backend.clone(), None),
        None => {
            let path = config_path();
            if !path.exists() {
                return Err(CliError::NoConfig {
                    path: path.display().to_string(),
                });
            }
            let file_config: Config = load_config_from(&path)?;
            let (_, profile) = file_config.profile(global.profile.as_deref())?;
            (profile.backend.clone(), profile.email.clone())
        }
    };

    let url: url::Url = backend.parse().map_err(|_| CliError::Validation {
        field: "backend".into(),
        reason: format!("invalid URL: {backend}"),
    })?;
    Ok((url, email))
}

/// Resolve configuration, connect, and perform the initial refresh.
///
/// A cached session token that the backend rejects is cleared so the next
/// invocation falls back to credential login.
pub async fn connect_dashboard(global: &GlobalOpts) -> Result<Dashboard, CliError> {
    let config = resolve_dashboard_config(global)?;
    let used_session = matches!(config.auth, AuthCredentials::Token(_));
    let dashboard = Dashboard::new(config);

    if let Err(e) = dashboard.connect().await {
        if used_session && matches!(e, CoreError::AuthenticationFailed { .. }) {
            tracing::info!("cached session rejected; clearing it");
            let _ = clear_session();
            return Err(CliError::NotAuthenticated);
        }
        return Err(e.into());
    }
    Ok(dashboard)
}
