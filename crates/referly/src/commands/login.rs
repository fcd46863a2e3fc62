//! `login`, `logout`, and `whoami`: session cache management.

use std::io::IsTerminal;
use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Serialize;

use referly_api::AffiliateClient;
use referly_api::transport::{TlsMode, TransportConfig};
use referly_config::{SessionCache, clear_session, load_session, save_session, session_path};
use referly_core::CoreError;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::resolve_login_target;
use crate::error::CliError;
use crate::output;

/// Authenticate with email/password and cache the resulting session.
pub async fn login(args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (backend, profile_email) = resolve_login_target(global)?;

    let email = args
        .email
        .or(profile_email)
        .or_else(|| std::env::var("REFERLY_EMAIL").ok())
        .ok_or_else(|| CliError::Validation {
            field: "email".into(),
            reason: "provide --email, a profile email, or REFERLY_EMAIL".into(),
        })?;

    let password = match args.password {
        Some(pw) => pw,
        None => match std::env::var("REFERLY_PASSWORD") {
            Ok(pw) => pw,
            Err(_) if std::io::stdin().is_terminal() => {
                rpassword::prompt_password(format!("Password for {email}: "))?
            }
            Err(_) => {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "provide --password or REFERLY_PASSWORD when stdin is not a terminal"
                        .into(),
                });
            }
        },
    };

    let transport = TransportConfig {
        tls: if global.insecure {
            TlsMode::DangerAcceptInvalid
        } else {
            TlsMode::System
        },
        timeout: Duration::from_secs(global.timeout),
    };
    let client = AffiliateClient::new(backend, &transport).map_err(CoreError::from)?;
    let auth = client.login(&email, &password).await.map_err(CoreError::from)?;

    let identity = referly_core::AffiliateIdentity::from(auth);
    let display = identity.email.clone().unwrap_or_else(|| email.clone());

    match &identity.token {
        Some(token) => {
            let session = SessionCache {
                name: identity.name.clone(),
                email: identity.email.clone().or(Some(email)),
                role: identity.role.clone().unwrap_or_else(|| "user".into()),
                token: token.expose_secret().to_owned(),
            };
            save_session(&session)?;
            output::print_output(
                &format!("Logged in as {display}. Session cached at {}", session_path().display()),
                global.quiet,
            );
        }
        // Cookie-only deployments issue no token; there is nothing to cache.
        None => {
            output::print_output(
                &format!("Logged in as {display}. Backend issued no session token; credentials will be required per command."),
                global.quiet,
            );
        }
    }
    Ok(())
}

/// Delete the cached session.
pub fn logout(global: &GlobalOpts) -> Result<(), CliError> {
    let had_session = load_session().unwrap_or(None).is_some();
    clear_session()?;
    let msg = if had_session {
        "Session cleared."
    } else {
        "No active session."
    };
    output::print_output(msg, global.quiet);
    Ok(())
}

/// Token-free view of the cached identity, safe to serialize.
#[derive(Serialize)]
struct IdentityView {
    name: Option<String>,
    email: Option<String>,
    role: String,
}

/// Show the cached session identity.
pub fn whoami(global: &GlobalOpts) -> Result<(), CliError> {
    let session = load_session()?.ok_or(CliError::NotAuthenticated)?;
    let view = IdentityView {
        name: session.name,
        email: session.email,
        role: session.role,
    };

    let out = output::render_single(
        &global.output,
        &view,
        |v| {
            format!(
                "Name   {}\nEmail  {}\nRole   {}",
                v.name.as_deref().unwrap_or("-"),
                v.email.as_deref().unwrap_or("-"),
                v.role
            )
        },
        |v| v.email.clone().unwrap_or_else(|| "-".into()),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
