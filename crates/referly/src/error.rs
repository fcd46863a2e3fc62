//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use referly_config::ConfigError;
use referly_core::CoreError;

/// Exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const DATA: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to backend at {url}")]
    #[diagnostic(
        code(referly::connection_failed),
        help(
            "Check that the backend is reachable.\n\
             URL: {url}\n\
             Try: referly stats --insecure"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(referly::auth_failed),
        help("Verify your email and password, then run: referly login")
    )]
    AuthFailed { message: String },

    #[error("Not logged in")]
    #[diagnostic(
        code(referly::not_authenticated),
        help("Run: referly login --email you@example.com")
    )]
    NotAuthenticated,

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(referly::no_credentials),
        help(
            "Configure credentials with: referly config init\n\
             Or set the REFERLY_EMAIL and REFERLY_PASSWORD environment variables."
        )
    )]
    NoCredentials { profile: String },

    // ── Data ─────────────────────────────────────────────────────────
    #[error("Cannot aggregate earnings across currencies ({found} alongside {expected})")]
    #[diagnostic(
        code(referly::mixed_currencies),
        help(
            "Referral codes carry commission rules in more than one currency;\n\
             totals across them would be meaningless. Inspect per-code earnings\n\
             with: referly codes -o json"
        )
    )]
    MixedCurrencies { expected: String, found: String },

    #[error("Backend error: {message}")]
    #[diagnostic(code(referly::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(referly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(referly::profile_not_found),
        help("Create one with: referly config init --backend <url> --name {name}")
    )]
    ProfileNotFound { name: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(referly::no_config),
        help(
            "Create one with: referly config init --backend <url>\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(referly::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(referly::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NotAuthenticated | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::MixedCurrencies { .. } => exit_code::DATA,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::NotAuthenticated => CliError::NotAuthenticated,
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::MixedCurrencies { expected, found } => {
                CliError::MixedCurrencies { expected, found }
            }
            CoreError::Api { message, status: _ } => CliError::ApiError { message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::ApiError { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound { name: profile },
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::SessionCache(e) => CliError::Json(e),
            other => CliError::Validation {
                field: "config".into(),
                reason: other.to_string(),
            },
        }
    }
}
