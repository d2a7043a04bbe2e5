//! One-shot scrape from the terminal.

use crate::browser::chromium::ChromiumEngine;
use crate::browser::BrowserEngine;
use crate::cli::output::{self, Styled};
use crate::config::AppConfig;
use crate::pipeline::{Outcome, Pipeline};
use crate::store::sqlite::SqliteStore;
use crate::store::ProfileStore;
use anyhow::Result;
use std::sync::Arc;

/// Run the full pipeline once for a single target identifier.
pub async fn run(target_identifier: &str) -> Result<()> {
    let s = Styled::new();
    super::init_tracing();
    let config = AppConfig::from_env();

    let store: Arc<dyn ProfileStore> = Arc::new(SqliteStore::open(&config.db_path)?);
    let engine: Arc<dyn BrowserEngine> = Arc::new(ChromiumEngine::new()?);
    let pipeline = Pipeline::new(engine, store, config);

    match pipeline.run(target_identifier).await {
        Ok(Outcome::Created { record }) => {
            if output::is_json() {
                output::print_json(&serde_json::json!({
                    "created": true,
                    "record_id": record.id,
                    "profile": record,
                }));
            } else if !output::is_quiet() {
                println!("  {} saved {} ({})", s.ok_sym(), record.name, record.id);
                println!("    title:        {}", record.title);
                println!("    organization: {}", record.organization);
                println!("    location:     {}", record.location);
            }
            Ok(())
        }
        Ok(Outcome::Conflict { existing }) => {
            if output::is_json() {
                output::print_json(&serde_json::json!({
                    "created": false,
                    "existing_record_id": existing.id,
                }));
            } else if !output::is_quiet() {
                println!(
                    "  {} already ingested as {}, nothing to do",
                    s.warn_sym(),
                    existing.id
                );
            }
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
