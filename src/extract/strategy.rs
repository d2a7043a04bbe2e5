//! Ordered-fallback evaluation of candidate locators.
//!
//! The target page's markup is unstable and unversioned, so each logical
//! field carries an ordered list of candidate selectors. Evaluation walks
//! the list and the first locator producing non-empty text wins. Ordering
//! encodes priority, not exhaustiveness.

use crate::browser::BrowserSession;
use tracing::{debug, warn};

/// One place a field's value might appear, plus a label for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct CandidateLocator {
    pub selector: &'static str,
    pub label: &'static str,
}

/// Evaluate the locators in order and return the first non-empty trimmed
/// text, or `default_value` verbatim when every locator misses.
///
/// A locator that does not resolve, is not visible, or yields only
/// whitespace is a miss, never an error. An unexpected probe failure is
/// logged and treated as a miss as well; a single broken selector must
/// not abort the whole extraction. Read-only: page state is never mutated.
pub async fn evaluate(
    session: &dyn BrowserSession,
    locators: &[CandidateLocator],
    default_value: &str,
) -> String {
    for locator in locators {
        match probe(session, locator).await {
            Ok(Some(text)) => {
                debug!(
                    selector = locator.selector,
                    label = locator.label,
                    "locator matched"
                );
                return text;
            }
            Ok(None) => {
                debug!(selector = locator.selector, "locator missed");
            }
            Err(e) => {
                warn!(
                    selector = locator.selector,
                    "locator probe failed, treating as miss: {e:#}"
                );
            }
        }
    }

    debug!(default_value, "all locators missed, using default");
    default_value.to_string()
}

/// Probe one locator: visibility first, then text. `None` is a miss.
async fn probe(
    session: &dyn BrowserSession,
    locator: &CandidateLocator,
) -> anyhow::Result<Option<String>> {
    if !session.is_visible(locator.selector).await? {
        return Ok(None);
    }
    let text = session.text_content(locator.selector).await?;
    Ok(text
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty()))
}
