//! Browser abstraction for authenticated page scraping.
//!
//! Defines the `BrowserEngine` and `BrowserSession` traits that abstract
//! over the browser engine (currently Chromium via chromiumoxide). Each
//! pipeline run owns exactly one session; sessions are never pooled or
//! shared across runs.

pub mod chromium;
pub mod stealth;

use anyhow::Result;
use async_trait::async_trait;

/// A browser engine that can launch isolated scraping sessions.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Launch a fresh, isolated browser session (own process, own profile).
    async fn new_session(&self) -> Result<Box<dyn BrowserSession>>;

    /// Number of sessions launched and not yet closed.
    fn active_sessions(&self) -> usize;
}

/// One exclusively-owned browsing session: a live page plus the process
/// behind it. All inspection methods are read-only with respect to page
/// state; `fill` and `click` are the only mutating operations.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Load a URL and wait for the page to reach its ready state, bounded
    /// by the timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<()>;

    /// Wait for an in-flight navigation (e.g. after a form submit) to
    /// settle, bounded by the timeout.
    async fn wait_for_navigation(&mut self, timeout_ms: u64) -> Result<()>;

    /// Whether the selector resolves to a visible element.
    async fn is_visible(&self, selector: &str) -> Result<bool>;

    /// Text content of the first element matching the selector, or `None`
    /// if nothing matches.
    async fn text_content(&self, selector: &str) -> Result<Option<String>>;

    /// Set an input's value, firing the events a real keystroke would.
    async fn fill(&mut self, selector: &str, value: &str) -> Result<()>;

    /// Click the first element matching the selector.
    async fn click(&mut self, selector: &str) -> Result<()>;

    /// The page's current URL.
    async fn current_url(&self) -> Result<String>;

    /// Release the page, the browser process, and its event handler, in
    /// that order. Must be called on every exit path; a session may not
    /// outlive the request that opened it.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// A no-op engine used when Chromium is unavailable.
///
/// Keeps the REST surface alive so health/status respond; scrape requests
/// fail at the launch stage instead of at process startup.
pub struct NoopEngine;

#[async_trait]
impl BrowserEngine for NoopEngine {
    async fn new_session(&self) -> Result<Box<dyn BrowserSession>> {
        Err(anyhow::anyhow!(
            "browser not available, install Chromium or set PROSPECT_CHROMIUM_PATH"
        ))
    }

    fn active_sessions(&self) -> usize {
        0
    }
}
