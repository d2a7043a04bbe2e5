//! Persistent profile store.
//!
//! The pipeline needs exactly two operations: a lookup by natural key for
//! the dedup guard, and an insert. The trait keeps that surface narrow so
//! tests can substitute an in-memory fake. Uniqueness of the natural key
//! is NOT enforced here; the dedup guard lives in the pipeline.

pub mod sqlite;

use crate::extract::ExtractedProfile;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted profile record with its store-assigned id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredProfile {
    pub id: String,
    pub target_identifier: String,
    pub name: String,
    pub title: String,
    pub organization: String,
    pub location: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Document store for extracted profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Look up a record by its natural key.
    async fn find_by_identifier(&self, target_identifier: &str) -> Result<Option<StoredProfile>>;

    /// Persist an extracted profile, returning the stored record with its
    /// assigned id.
    async fn insert(&self, profile: &ExtractedProfile) -> Result<StoredProfile>;
}
