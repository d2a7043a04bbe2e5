//! Login-surface handling for scraping sessions.
//!
//! Authentication is a best-effort heuristic: the session navigates to the
//! login surface and submits credentials only if a login form is actually
//! present. An absent form is taken to mean the profile directory already
//! carries valid cookies.

use crate::browser::BrowserSession;
use crate::config::AuthCredentials;
use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

/// Username input on the login surface.
pub const USERNAME_SELECTOR: &str = "#username";
/// Password input on the login surface.
pub const PASSWORD_SELECTOR: &str = "#password";
/// Form submit control.
pub const SUBMIT_SELECTOR: &str = "button[type=\"submit\"]";

/// How the session ended up authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Credentials were submitted and the post-login navigation settled.
    LoggedIn,
    /// No login form was detected; assumed already authenticated.
    AlreadyAuthenticated,
}

/// Authenticate a fresh session against the login surface.
///
/// Navigates to `login_url`; iff the username field is visible, fills both
/// credential fields, submits, and waits (bounded) for the post-login
/// navigation. Overruns and missing credentials are errors; the pipeline
/// maps them to its authentication failure kind.
pub async fn authenticate(
    session: &mut dyn BrowserSession,
    login_url: &str,
    credentials: Option<&AuthCredentials>,
    timeout_ms: u64,
) -> Result<AuthOutcome> {
    session
        .navigate(login_url, timeout_ms)
        .await
        .context("login surface unreachable")?;

    if !session.is_visible(USERNAME_SELECTOR).await? {
        debug!("no login form detected, assuming existing session state");
        return Ok(AuthOutcome::AlreadyAuthenticated);
    }

    let creds = credentials
        .ok_or_else(|| anyhow!("login form detected but no credentials are configured"))?;

    info!("login form detected, submitting credentials");
    session.fill(USERNAME_SELECTOR, &creds.identifier).await?;
    session.fill(PASSWORD_SELECTOR, &creds.secret).await?;
    session.click(SUBMIT_SELECTOR).await?;

    session
        .wait_for_navigation(timeout_ms)
        .await
        .context("post-login navigation did not settle")?;

    Ok(AuthOutcome::LoggedIn)
}
