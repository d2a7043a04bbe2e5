//! Stage-failure taxonomy for the ingestion pipeline.
//!
//! Every fatal kind maps to one pipeline stage. Field-level extraction
//! misses are not represented here: each field falls back to its
//! configured default instead of failing the run.

use thiserror::Error;

/// A fatal pipeline failure, tagged with the stage that produced it.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request was malformed before any work started. Never retried.
    #[error("invalid request: {0}")]
    InvalidInput(String),

    /// The underlying browser process failed to start.
    #[error("browser session launch failed: {0:#}")]
    SessionLaunch(anyhow::Error),

    /// A login form was detected but submission did not settle in time.
    #[error("authentication did not complete: {0:#}")]
    Authentication(anyhow::Error),

    /// The target page did not reach its ready state within the timeout.
    #[error("navigation failed: {0:#}")]
    NavigationTimeout(anyhow::Error),

    /// The store rejected a read or write.
    #[error("store operation failed: {0:#}")]
    Persistence(anyhow::Error),
}

impl PipelineError {
    /// Stable stage name for logs and machine-readable responses.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "input_validation",
            Self::SessionLaunch(_) => "session_launch",
            Self::Authentication(_) => "authentication",
            Self::NavigationTimeout(_) => "navigation",
            Self::Persistence(_) => "persistence",
        }
    }
}
