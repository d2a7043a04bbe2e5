// Copyright 2026 Prospect Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP REST API.
//!
//! Thin request/response mapping over the pipeline: caller-correctable
//! failures get their own status codes (400, 409), every fatal stage
//! failure is a 500 with a diagnostic message. Selector-level diagnostics
//! stay in the logs.

use crate::browser::BrowserEngine;
use crate::error::PipelineError;
use crate::pipeline::{Outcome, Pipeline};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared state behind the REST handlers.
pub struct AppState {
    pub pipeline: Pipeline,
    pub engine: Arc<dyn BrowserEngine>,
    pub started_at: Instant,
}

/// Build the axum Router with all REST endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/status", get(handle_status))
        .route("/api/v1/profiles/scrape", post(handle_scrape))
        .layer(cors)
        .with_state(state)
}

/// Start the REST API server on the given port.
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("REST API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn handle_status(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "running": true,
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs_f64(),
        "active_sessions": state.engine.active_sessions(),
    }))
}

/// Scrape request body.
#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub target_identifier: String,
}

async fn handle_scrape(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScrapeRequest>,
) -> impl IntoResponse {
    match state.pipeline.run(&body.target_identifier).await {
        Ok(Outcome::Created { record }) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "profile saved",
                "record_id": record.id,
                "profile": record,
            })),
        ),
        Ok(Outcome::Conflict { existing }) => (
            StatusCode::CONFLICT,
            Json(json!({
                "message": "profile already exists in store",
                "existing_record_id": existing.id,
            })),
        ),
        Err(PipelineError::InvalidInput(message)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "message": message })))
        }
        Err(e) => {
            error!(stage = e.stage(), "scrape failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "message": "failed to process target profile",
                    "error": e.to_string(),
                })),
            )
        }
    }
}
