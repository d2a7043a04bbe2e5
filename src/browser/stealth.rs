//! Fingerprint hardening for scraping sessions.
//!
//! The target site fingerprints automated browsers aggressively. Sessions
//! present a stock desktop Chrome identity: a realistic user-agent, a
//! desktop viewport, the `AutomationControlled` blink feature disabled,
//! and `navigator.webdriver` overridden in page context.

/// Identifying string presented instead of the default headless signature.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Desktop viewport dimensions.
pub const WINDOW_WIDTH: u32 = 1920;
pub const WINDOW_HEIGHT: u32 = 1080;

/// Masks the automation flag the CDP connection would otherwise expose.
/// Evaluated on the fresh page and re-asserted after each document swap.
pub const WEBDRIVER_OVERRIDE: &str = r#"
    Object.defineProperty(navigator, 'webdriver', {
        get: () => false
    });
"#;

/// Chromium launch flags for an isolated, low-noise headless instance.
pub fn launch_args() -> Vec<String> {
    [
        "--headless=new",
        "--disable-gpu",
        "--no-sandbox",
        "--disable-setuid-sandbox",
        "--disable-dev-shm-usage",
        "--disable-extensions",
        "--disable-background-networking",
        "--disable-blink-features=AutomationControlled",
        "--disable-infobars",
        "--no-first-run",
        "--no-default-browser-check",
        "--mute-audio",
        "--hide-scrollbars",
    ]
    .iter()
    .map(|s| s.to_string())
    .chain(std::iter::once(format!("--user-agent={USER_AGENT}")))
    .collect()
}
