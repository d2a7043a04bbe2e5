//! Start the REST API.

use crate::browser::chromium::ChromiumEngine;
use crate::browser::{BrowserEngine, NoopEngine};
use crate::cli::output::{self, Styled};
use crate::config::AppConfig;
use crate::pipeline::Pipeline;
use crate::rest::{self, AppState};
use crate::store::sqlite::SqliteStore;
use crate::store::ProfileStore;
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Composition root: config, store, engine, pipeline, REST server.
pub async fn run(port_override: Option<u16>) -> Result<()> {
    let s = Styled::new();

    super::init_tracing();

    let config = AppConfig::from_env();
    let port = port_override.unwrap_or(config.http_port);

    info!("starting prospect v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn ProfileStore> = Arc::new(SqliteStore::open(&config.db_path)?);
    info!("store ready at {}", config.db_path.display());

    // Degrade to a launch-failing engine rather than refusing to start:
    // health and status must answer even on hosts without Chromium.
    let engine: Arc<dyn BrowserEngine> = match ChromiumEngine::new() {
        Ok(engine) => {
            info!("Chromium engine initialized");
            Arc::new(engine)
        }
        Err(e) => {
            warn!("Chromium unavailable: {e:#}");
            warn!("scrape requests will fail at session launch");
            Arc::new(NoopEngine)
        }
    };

    if config.credentials.is_none() {
        warn!("no login credentials configured; a visible login form will fail the run");
    }

    let state = Arc::new(AppState {
        pipeline: Pipeline::new(Arc::clone(&engine), Arc::clone(&store), config.clone()),
        engine,
        started_at: Instant::now(),
    });

    if !output::is_quiet() {
        eprintln!(
            "  {} prospect v{} listening on http://127.0.0.1:{port}",
            s.ok_sym(),
            env!("CARGO_PKG_VERSION"),
        );
    }

    rest::serve(port, state).await?;

    if !output::is_quiet() {
        eprintln!("  {} prospect stopped.", s.ok_sym());
    }
    Ok(())
}
