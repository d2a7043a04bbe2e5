//! Ingestion orchestrator.
//!
//! Drives one scrape request through validation, the dedup guard, session
//! launch, authentication, navigation, extraction, and persistence.
//! Invariant: a launched session is closed exactly once on every exit
//! path. No browser process may outlive the request that opened it.

use crate::auth;
use crate::browser::{BrowserEngine, BrowserSession};
use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::extract::{extract_profile, ExtractedProfile};
use crate::store::{ProfileStore, StoredProfile};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Terminal result of a pipeline run that did not fail.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A new record was extracted and persisted.
    Created { record: StoredProfile },
    /// The identifier was already ingested; no browsing work performed.
    Conflict { existing: StoredProfile },
}

/// The scrape pipeline with its injected collaborators.
pub struct Pipeline {
    engine: Arc<dyn BrowserEngine>,
    store: Arc<dyn ProfileStore>,
    config: AppConfig,
}

impl Pipeline {
    pub fn new(
        engine: Arc<dyn BrowserEngine>,
        store: Arc<dyn ProfileStore>,
        config: AppConfig,
    ) -> Self {
        Self {
            engine,
            store,
            config,
        }
    }

    /// Run one request end to end.
    ///
    /// Stage failures map to their [`PipelineError`] kind; a dedup hit is
    /// an [`Outcome::Conflict`], not an error.
    pub async fn run(&self, target_identifier: &str) -> Result<Outcome, PipelineError> {
        let target = target_identifier.trim();
        if target.is_empty() {
            return Err(PipelineError::InvalidInput(
                "target_identifier is required".to_string(),
            ));
        }

        let host = Url::parse(target)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "<non-url>".to_string());
        info!(target_host = %host, "scrape requested");

        // Dedup guard: a given identifier triggers at most one extraction,
        // however many times a client submits it.
        let existing = self
            .store
            .find_by_identifier(target)
            .await
            .map_err(PipelineError::Persistence)?;
        if let Some(existing) = existing {
            info!(record_id = %existing.id, "identifier already ingested, skipping session");
            return Ok(Outcome::Conflict { existing });
        }

        let mut session = self
            .engine
            .new_session()
            .await
            .map_err(PipelineError::SessionLaunch)?;

        // Everything between launch and close runs through `drive` so the
        // session is released on every path, success or failure.
        let driven = self.drive(session.as_mut(), target).await;
        if let Err(e) = session.close().await {
            warn!("session close failed: {e:#}");
        }
        let profile = driven?;

        let record = self
            .store
            .insert(&profile)
            .await
            .map_err(PipelineError::Persistence)?;
        info!(record_id = %record.id, "profile persisted");

        Ok(Outcome::Created { record })
    }

    /// Authenticate, navigate, extract. Never touches session teardown.
    async fn drive(
        &self,
        session: &mut dyn BrowserSession,
        target: &str,
    ) -> Result<ExtractedProfile, PipelineError> {
        let outcome = auth::authenticate(
            session,
            &self.config.login_url,
            self.config.credentials.as_ref(),
            self.config.login_timeout_ms,
        )
        .await
        .map_err(PipelineError::Authentication)?;
        debug!(?outcome, "authentication settled");

        session
            .navigate(target, self.config.nav_timeout_ms)
            .await
            .map_err(PipelineError::NavigationTimeout)?;

        Ok(extract_profile(&*session, target, self.config.settle_ms).await)
    }
}
