//! Profile field extraction from a loaded target page.
//!
//! Five logical fields, each with its own ordered fallback plan. The
//! selector lists track the target site's unstable markup generations,
//! newest first where known, broadest last.

pub mod strategy;

use crate::browser::BrowserSession;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strategy::CandidateLocator;
use tracing::debug;

/// The normalized result of one extraction run. Every field holds either
/// genuine page text or its plan's default, never null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedProfile {
    pub target_identifier: String,
    pub name: String,
    pub title: String,
    pub organization: String,
    pub location: String,
    pub summary: String,
    pub extracted_at: DateTime<Utc>,
}

/// Ordered fallback plan plus default value for one output field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: &'static str,
    pub locators: &'static [CandidateLocator],
    pub default_value: &'static str,
}

const fn loc(selector: &'static str, label: &'static str) -> CandidateLocator {
    CandidateLocator { selector, label }
}

pub const NAME: FieldSpec = FieldSpec {
    field: "name",
    locators: &[
        loc(".profile-header__name", "profile header name"),
        loc(".text-heading-xlarge", "heading xlarge"),
        loc(".pv-top-card-section__name", "top card name"),
        loc("h1.text-heading-xlarge", "h1 heading xlarge"),
        loc("h1.inline", "inline h1"),
        loc("h1.text-xl", "h1 text-xl"),
        loc(".profile-info h1", "profile info h1"),
    ],
    default_value: "Unknown Name",
};

pub const TITLE: FieldSpec = FieldSpec {
    field: "title",
    locators: &[
        loc(".profile-header__headline", "profile header headline"),
        loc(".text-body-medium", "body medium"),
        loc(".pv-top-card-section__headline", "top card headline"),
    ],
    default_value: "Unknown Title",
};

pub const ORGANIZATION: FieldSpec = FieldSpec {
    field: "organization",
    locators: &[
        loc(".profile-header__location-info", "profile header info"),
        loc(".pv-top-card-section__location", "top card location"),
        loc(".text-body-small", "body small"),
    ],
    default_value: "Unknown Company",
};

pub const LOCATION: FieldSpec = FieldSpec {
    field: "location",
    locators: &[
        loc(".profile-header__location-info", "profile header info"),
        loc(".pv-top-card-section__location", "top card location"),
        loc(".text-body-small.inline", "inline body small"),
        loc("[data-field=\"location\"]", "location data field"),
    ],
    default_value: "Unknown Location",
};

pub const SUMMARY: FieldSpec = FieldSpec {
    field: "summary",
    locators: &[
        loc(".pv-about__summary-text", "about summary text"),
        loc(".profile-section-card__contents", "section card contents"),
        loc(".about-section p", "about section paragraph"),
        loc(".profile-summary", "profile summary"),
        loc("[data-field=\"about\"] p", "about data field"),
        loc(".display-flex.ph5.pv3 span", "padded flex span"),
        loc("#about + div .inline-show-more-text", "about sibling show-more"),
        loc(".inline-show-more-text", "inline show-more"),
        loc("section.artdeco-card p", "card paragraph"),
        loc(".pv-shared-text-with-see-more", "shared text see-more"),
        loc(
            ".display-flex.full-width span.visually-hidden",
            "hidden full-width span",
        ),
        loc(
            "#about-section .pv-shared-text-with-see-more span",
            "about section see-more span",
        ),
        loc(".about-summary", "about summary"),
        loc("#about ~ div .pv-shared-text-with-see-more", "about sibling see-more"),
    ],
    default_value: "",
};

/// All five field plans, in output order.
pub const FIELD_SPECS: [FieldSpec; 5] = [NAME, TITLE, ORGANIZATION, LOCATION, SUMMARY];

/// Extract every field from the loaded page.
///
/// Sleeps once for `settle_ms` before reading anything: client-rendered
/// sections keep populating after the navigation event fires, and there is
/// no readiness signal to wait on. Fields are independent; evaluation
/// order carries no meaning. This function cannot fail: a field whose
/// locators all miss gets its default.
pub async fn extract_profile(
    session: &dyn BrowserSession,
    target_identifier: &str,
    settle_ms: u64,
) -> ExtractedProfile {
    debug!(settle_ms, "settling before extraction");
    tokio::time::sleep(std::time::Duration::from_millis(settle_ms)).await;

    let name = strategy::evaluate(session, NAME.locators, NAME.default_value).await;
    let title = strategy::evaluate(session, TITLE.locators, TITLE.default_value).await;
    let organization =
        strategy::evaluate(session, ORGANIZATION.locators, ORGANIZATION.default_value).await;
    let location = strategy::evaluate(session, LOCATION.locators, LOCATION.default_value).await;
    let summary = strategy::evaluate(session, SUMMARY.locators, SUMMARY.default_value).await;

    ExtractedProfile {
        target_identifier: target_identifier.to_string(),
        name,
        title,
        organization,
        location,
        summary,
        extracted_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_fields_fixed() {
        assert_eq!(FIELD_SPECS.len(), 5);
        let names: Vec<_> = FIELD_SPECS.iter().map(|s| s.field).collect();
        assert_eq!(
            names,
            vec!["name", "title", "organization", "location", "summary"]
        );
    }

    #[test]
    fn test_every_field_has_a_plan() {
        for spec in FIELD_SPECS {
            assert!(!spec.locators.is_empty(), "{} has no locators", spec.field);
        }
        // Summary is the only field whose absence is acceptable as empty.
        assert_eq!(SUMMARY.default_value, "");
        assert_eq!(NAME.default_value, "Unknown Name");
    }
}
