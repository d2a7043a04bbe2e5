//! SQLite-backed profile store.

use super::{ProfileStore, StoredProfile};
use crate::extract::ExtractedProfile;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;
use tokio::sync::Mutex;

/// Profile store backed by a single SQLite database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create store directory {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open store: {}", path.display()))?;
        Self::init(conn)
    }

    /// In-memory store, used by one-shot CLI dry runs and tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory store")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        // target_identifier deliberately carries no UNIQUE constraint:
        // deduplication is an application-layer guard.
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                target_identifier TEXT NOT NULL,
                name TEXT NOT NULL,
                title TEXT NOT NULL,
                organization TEXT NOT NULL,
                location TEXT NOT NULL,
                summary TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_profiles_identifier
                ON profiles (target_identifier);",
        )
        .context("failed to create profiles table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<u64> {
        let conn = self.conn.lock().await;
        let n: u64 = conn.query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))?;
        Ok(n)
    }
}

#[async_trait]
impl ProfileStore for SqliteStore {
    async fn find_by_identifier(&self, target_identifier: &str) -> Result<Option<StoredProfile>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, target_identifier, name, title, organization, location, summary,
                    created_at, updated_at
             FROM profiles WHERE target_identifier = ?1
             ORDER BY created_at LIMIT 1",
        )?;

        let row = stmt.query_row(rusqlite::params![target_identifier], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, String>(8)?,
            ))
        });

        match row {
            Ok(fields) => Ok(Some(row_to_profile(fields)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn insert(&self, profile: &ExtractedProfile) -> Result<StoredProfile> {
        let now = Utc::now();
        let record = StoredProfile {
            id: uuid::Uuid::new_v4().to_string(),
            target_identifier: profile.target_identifier.clone(),
            name: profile.name.clone(),
            title: profile.title.clone(),
            organization: profile.organization.clone(),
            location: profile.location.clone(),
            summary: profile.summary.clone(),
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO profiles
                (id, target_identifier, name, title, organization, location, summary,
                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                record.id,
                record.target_identifier,
                record.name,
                record.title,
                record.organization,
                record.location,
                record.summary,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )
        .context("failed to insert profile")?;

        Ok(record)
    }
}

type ProfileRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
);

fn row_to_profile(fields: ProfileRow) -> Result<StoredProfile> {
    let (id, target_identifier, name, title, organization, location, summary, created, updated) =
        fields;
    Ok(StoredProfile {
        id,
        target_identifier,
        name,
        title,
        organization,
        location,
        summary,
        created_at: parse_ts(&created)?,
        updated_at: parse_ts(&updated)?,
    })
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("malformed timestamp in store: {raw}"))?
        .with_timezone(&Utc))
}
