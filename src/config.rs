//! Process-wide configuration, read once at startup.
//!
//! Everything here is immutable for the lifetime of the process and is
//! passed into the composition root explicitly; no module-level state.
//! All knobs come from `PROSPECT_*` environment variables.

use std::path::PathBuf;

/// Login surface used when none is configured.
pub const DEFAULT_LOGIN_URL: &str = "https://www.linkedin.com/login";

/// Default REST API port.
pub const DEFAULT_HTTP_PORT: u16 = 8484;

/// Bound on target-page navigation and post-login settling.
const DEFAULT_NAV_TIMEOUT_MS: u64 = 60_000;

/// Fixed settling delay before field extraction begins. A heuristic for
/// client-rendered content that does not signal readiness through the
/// navigation event; not a readiness guarantee.
const DEFAULT_SETTLE_MS: u64 = 5_000;

/// Credentials for the login surface. Read-only for the process lifetime.
#[derive(Debug, Clone)]
pub struct AuthCredentials {
    pub identifier: String,
    pub secret: String,
}

/// Runtime configuration assembled from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite store location.
    pub db_path: PathBuf,
    /// Where the login form lives.
    pub login_url: String,
    /// Optional login credentials. A visible login form with no
    /// credentials configured is an authentication failure.
    pub credentials: Option<AuthCredentials>,
    /// API key for the downstream message-generation service. Carried in
    /// configuration only; the scraping core never reads it.
    pub genai_key: Option<String>,
    pub http_port: u16,
    pub nav_timeout_ms: u64,
    pub login_timeout_ms: u64,
    pub settle_ms: u64,
}

impl AppConfig {
    /// Read configuration from `PROSPECT_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let db_path = std::env::var("PROSPECT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir().join("profiles.db"));

        let credentials = match (
            std::env::var("PROSPECT_LOGIN_USER"),
            std::env::var("PROSPECT_LOGIN_PASSWORD"),
        ) {
            (Ok(identifier), Ok(secret)) => Some(AuthCredentials { identifier, secret }),
            _ => None,
        };

        Self {
            db_path,
            login_url: std::env::var("PROSPECT_LOGIN_URL")
                .unwrap_or_else(|_| DEFAULT_LOGIN_URL.to_string()),
            credentials,
            genai_key: std::env::var("PROSPECT_GENAI_KEY").ok(),
            http_port: env_u64("PROSPECT_HTTP_PORT")
                .map(|p| p as u16)
                .unwrap_or(DEFAULT_HTTP_PORT),
            nav_timeout_ms: env_u64("PROSPECT_NAV_TIMEOUT_MS").unwrap_or(DEFAULT_NAV_TIMEOUT_MS),
            login_timeout_ms: env_u64("PROSPECT_LOGIN_TIMEOUT_MS")
                .unwrap_or(DEFAULT_NAV_TIMEOUT_MS),
            settle_ms: env_u64("PROSPECT_SETTLE_MS").unwrap_or(DEFAULT_SETTLE_MS),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: data_dir().join("profiles.db"),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            credentials: None,
            genai_key: None,
            http_port: DEFAULT_HTTP_PORT,
            nav_timeout_ms: DEFAULT_NAV_TIMEOUT_MS,
            login_timeout_ms: DEFAULT_NAV_TIMEOUT_MS,
            settle_ms: DEFAULT_SETTLE_MS,
        }
    }
}

/// Per-user data directory (`~/.prospect`).
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".prospect")
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
