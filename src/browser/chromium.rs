//! Chromium-based scraping sessions using chromiumoxide.
//!
//! Every session launches its own Chromium process with its own profile
//! directory: no pooling, no cross-request cookie or storage sharing.
//! The per-request startup cost buys complete state isolation between
//! runs.

use super::{stealth, BrowserEngine, BrowserSession};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. PROSPECT_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("PROSPECT_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
        warn!(
            "PROSPECT_CHROMIUM_PATH points to non-existent file: {}",
            path.display()
        );
    }

    // 2. ~/.prospect/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".prospect/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".prospect/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".prospect/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".prospect/chromium/chrome-linux64/chrome"),
                home.join(".prospect/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS locations
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Launches one isolated Chromium process per session.
pub struct ChromiumEngine {
    chrome_path: PathBuf,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumEngine {
    /// Create an engine, resolving the Chromium binary up front so launch
    /// failures at request time are about the process, not the path.
    pub fn new() -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found. Install Chrome or set PROSPECT_CHROMIUM_PATH.")?;
        Ok(Self {
            chrome_path,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Use a specific executable (tests, custom installs).
    pub fn with_executable(chrome_path: PathBuf) -> Self {
        Self {
            chrome_path,
            active_count: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn new_session(&self) -> Result<Box<dyn BrowserSession>> {
        // Unique profile dir per session; removed on close.
        let user_data_dir = std::env::temp_dir().join(format!(
            "prospect_session_{}",
            uuid::Uuid::new_v4().simple()
        ));
        std::fs::create_dir_all(&user_data_dir)
            .context("failed to create session profile directory")?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(&self.chrome_path)
            .window_size(stealth::WINDOW_WIDTH, stealth::WINDOW_HEIGHT)
            .user_data_dir(&user_data_dir);
        for arg in stealth::launch_args() {
            builder = builder.arg(arg);
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let launched = Browser::launch(config).await;
        let (browser, mut handler) = match launched {
            Ok(pair) => pair,
            Err(e) => {
                let _ = std::fs::remove_dir_all(&user_data_dir);
                return Err(anyhow::Error::from(e).context("failed to launch Chromium"));
            }
        };

        // Drain CDP events for the lifetime of the session.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let mut browser = browser;
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler_task.abort();
                let _ = std::fs::remove_dir_all(&user_data_dir);
                return Err(anyhow::Error::from(e).context("failed to create page"));
            }
        };

        // Mask the automation flag before any target content loads.
        let _ = page.evaluate(stealth::WEBDRIVER_OVERRIDE).await;

        self.active_count.fetch_add(1, Ordering::Relaxed);
        debug!("launched session with profile {}", user_data_dir.display());

        Ok(Box::new(ChromiumSession {
            page,
            browser,
            handler_task,
            user_data_dir,
            active_count: Arc::clone(&self.active_count),
        }))
    }

    fn active_sessions(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// A single Chromium process plus its one page.
pub struct ChromiumSession {
    page: Page,
    browser: Browser,
    handler_task: JoinHandle<()>,
    user_data_dir: PathBuf,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumSession {
    /// Evaluate JS in page context and return the JSON result.
    async fn eval(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS evaluation failed")?;
        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert JS result: {e:?}"))
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<()> {
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(timeout_ms),
            self.page.goto(url),
        )
        .await;

        match result {
            Ok(Ok(_)) => {
                let _ = self.page.wait_for_navigation().await;
                // Document swapped; re-assert the override.
                let _ = self.page.evaluate(stealth::WEBDRIVER_OVERRIDE).await;
                Ok(())
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {timeout_ms}ms"),
        }
    }

    async fn wait_for_navigation(&mut self, timeout_ms: u64) -> Result<()> {
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(timeout_ms),
            self.page.wait_for_navigation(),
        )
        .await;

        match result {
            Ok(Ok(_)) => {
                let _ = self.page.evaluate(stealth::WEBDRIVER_OVERRIDE).await;
                Ok(())
            }
            Ok(Err(e)) => bail!("navigation wait failed: {e}"),
            Err(_) => bail!("navigation did not settle within {timeout_ms}ms"),
        }
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector('{}');
                if (!el) return false;
                const style = window.getComputedStyle(el);
                return style.display !== 'none'
                    && style.visibility !== 'hidden'
                    && el.getClientRects().length > 0;
            }})()"#,
            sanitize_js_string(selector)
        );
        Ok(self.eval(&js).await?.as_bool().unwrap_or(false))
    }

    async fn text_content(&self, selector: &str) -> Result<Option<String>> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector('{}');
                return el ? el.textContent : null;
            }})()"#,
            sanitize_js_string(selector)
        );
        match self.eval(&js).await? {
            serde_json::Value::String(text) => Ok(Some(text)),
            _ => Ok(None),
        }
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector('{}');
                if (el) {{
                    el.value = '{}';
                    el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                    el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                    return {{ success: true }};
                }}
                return {{ success: false }};
            }})()"#,
            sanitize_js_string(selector),
            sanitize_js_string(value)
        );
        let result = self.eval(&js).await?;
        if !result
            .get("success")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
        {
            bail!("no element matches input selector: {selector}");
        }
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector('{}');
                if (el) {{ el.click(); return {{ success: true }}; }}
                return {{ success: false }};
            }})()"#,
            sanitize_js_string(selector)
        );
        let result = self.eval(&js).await?;
        if !result
            .get("success")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
        {
            bail!("no element matches click selector: {selector}");
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .context("failed to get URL")?
            .map(|u| u.to_string())
            .unwrap_or_default();
        Ok(url)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let Self {
            page,
            mut browser,
            handler_task,
            user_data_dir,
            active_count,
        } = *self;

        // Page, then process, then handler. Chrome must exit before the
        // profile directory is removed or the removal races file handles.
        let _ = page.close().await;
        if let Err(e) = browser.close().await {
            warn!("failed to close browser cleanly: {e}");
        }
        if let Err(e) = browser.wait().await {
            warn!("failed to wait for browser exit: {e}");
        }
        handler_task.abort();

        if let Err(e) = std::fs::remove_dir_all(&user_data_dir) {
            warn!(
                "failed to remove session profile {}: {e}",
                user_data_dir.display()
            );
        }

        active_count.fetch_sub(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Sanitize a string for safe injection into a JavaScript string literal.
///
/// Escapes everything that could break out of a JS string context:
/// backslashes, quotes, backticks, newlines, and angle brackets (to
/// prevent `</script>` injection). Null bytes are stripped.
fn sanitize_js_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '"' => result.push_str("\\\""),
            '`' => result.push_str("\\`"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\0' => {}
            '<' => result.push_str("\\x3c"),
            '>' => result.push_str("\\x3e"),
            _ => result.push(ch),
        }
    }
    result
}
