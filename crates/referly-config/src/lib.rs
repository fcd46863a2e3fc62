//! Shared configuration for the affiliate dashboard CLI.
//!
//! TOML profiles with environment overrides, credential resolution, the
//! session-identity cache, and translation to
//! `referly_core::DashboardConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use referly_core::{AuthCredentials, DashboardConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("unknown profile '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("session cache is corrupt: {0}")]
    SessionCache(#[from] serde_json::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "https://api.example.com/").
    pub backend: String,

    /// Affiliate scope for data fetches; "system" fetches system-level
    /// codes.
    #[serde(default = "default_affiliate_user_id")]
    pub affiliate_user_id: String,

    /// Login email.
    pub email: Option<String>,

    /// Login password (plaintext -- prefer the env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Background refresh interval in seconds. 0 disables it.
    pub refresh_interval: Option<u64>,
}

fn default_affiliate_user_id() -> String {
    "system".into()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "referly", "referly")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("referly");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Resolve the session cache path.
pub fn session_path() -> PathBuf {
    project_dirs().map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("session.json");
            p
        },
        |dirs| dirs.data_dir().join("session.json"),
    )
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from a specific file plus `REFERLY_*` env vars.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("REFERLY_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load the full Config from the canonical path.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write it to the given path.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

impl Config {
    /// Look up a profile by explicit name or the configured default.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());
        match self.profiles.get_key_value(name.as_str()) {
            Some((key, profile)) => Ok((key.as_str(), profile)),
            None => Err(ConfigError::UnknownProfile { profile: name }),
        }
    }
}

// ── Session cache ───────────────────────────────────────────────────

/// Cached session identity, persisted between CLI invocations.
///
/// The `role` field is validated on load: anything outside the known set
/// falls back to `"user"` rather than trusting a tampered or stale cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCache {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    pub token: String,
}

fn default_role() -> String {
    "user".into()
}

const KNOWN_ROLES: &[&str] = &["admin", "affiliate", "user"];

impl SessionCache {
    /// Clamp the role to the known set.
    fn normalize(mut self) -> Self {
        if !KNOWN_ROLES.contains(&self.role.as_str()) {
            self.role = default_role();
        }
        self
    }

    pub fn token(&self) -> SecretString {
        SecretString::from(self.token.clone())
    }
}

/// Load the cached session from a specific path, if one exists.
pub fn load_session_from(path: &Path) -> Result<Option<SessionCache>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)?;
    let session: SessionCache = serde_json::from_str(&raw)?;
    Ok(Some(session.normalize()))
}

/// Load the cached session from the canonical path.
pub fn load_session() -> Result<Option<SessionCache>, ConfigError> {
    load_session_from(&session_path())
}

/// Persist the session cache to a specific path.
pub fn save_session_to(session: &SessionCache, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(session)?)?;
    Ok(())
}

/// Persist the session cache to the canonical path.
pub fn save_session(session: &SessionCache) -> Result<(), ConfigError> {
    save_session_to(session, &session_path())
}

/// Delete the cached session, if any.
pub fn clear_session() -> Result<(), ConfigError> {
    let path = session_path();
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

// ── Translation to DashboardConfig ──────────────────────────────────

/// Resolve login credentials for a profile (env var first, then the
/// plaintext config field).
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let email = profile
        .email
        .clone()
        .or_else(|| std::env::var("REFERLY_EMAIL").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    if let Some(ref env_name) = profile.password_env {
        if let Ok(pw) = std::env::var(env_name) {
            return Ok((email, SecretString::from(pw)));
        }
    }

    if let Ok(pw) = std::env::var("REFERLY_PASSWORD") {
        return Ok((email, SecretString::from(pw)));
    }

    if let Some(ref pw) = profile.password {
        return Ok((email, SecretString::from(pw.clone())));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Build a `DashboardConfig` from a profile.
///
/// A cached session token takes precedence over credential login; pass
/// `None` to force a fresh login.
pub fn profile_to_dashboard_config(
    profile: &Profile,
    profile_name: &str,
    session: Option<&SessionCache>,
) -> Result<DashboardConfig, ConfigError> {
    let url: url::Url = profile.backend.parse().map_err(|_| ConfigError::Validation {
        field: "backend".into(),
        reason: format!("invalid URL: {}", profile.backend),
    })?;

    let auth = match session {
        Some(session) => AuthCredentials::Token(session.token()),
        None => {
            let (email, password) = resolve_credentials(profile, profile_name)?;
            AuthCredentials::Credentials { email, password }
        }
    };

    let mut config = DashboardConfig::new(url, auth);
    config.affiliate_user_id = profile.affiliate_user_id.clone();
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(default_timeout()));
    config.refresh_interval_secs = profile.refresh_interval.unwrap_or(0);
    config.accept_invalid_certs = profile.insecure.unwrap_or(false);
    Ok(config)
}
