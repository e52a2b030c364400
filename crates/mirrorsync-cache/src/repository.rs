//! SQLite implementation of the sync preferences port
//!
//! ## Type Mapping
//!
//! | Domain Type       | SQL Type | Strategy                                  |
//! |-------------------|----------|-------------------------------------------|
//! | SyncSection       | TEXT     | `as_str()` / `FromStr`                    |
//! | pairs (Vec)       | TEXT     | serde_json array                          |
//! | DateTime<Utc>     | TEXT     | ISO 8601 via `to_rfc3339()`               |

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tokio::sync::watch;

use mirrorsync_core::domain::{SectionPreference, SyncPreferences, SyncSection};
use mirrorsync_core::ports::ISyncPreferences;

use crate::CacheError;

/// SQLite-backed store of per-section sync preferences
///
/// `apply_persisted` publishes what it loads; consumers follow along
/// through [`subscribe`](Self::subscribe).
pub struct SqlitePreferenceRepository {
    pool: SqlitePool,
    applied: watch::Sender<SyncPreferences>,
}

impl SqlitePreferenceRepository {
    /// Creates a new repository instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        let (applied, _) = watch::channel(SyncPreferences::default());
        Self { pool, applied }
    }

    /// Receiver of the most recently applied preferences
    pub fn subscribe(&self) -> watch::Receiver<SyncPreferences> {
        self.applied.subscribe()
    }

    /// Reads every stored section
    ///
    /// Rows naming a section this build does not know are skipped.
    pub async fn load(&self) -> Result<SyncPreferences, CacheError> {
        let rows = sqlx::query("SELECT section, pairs, start_at FROM sync_preferences")
            .fetch_all(&self.pool)
            .await?;

        let mut preferences = SyncPreferences::new();
        for row in &rows {
            let section: String = row.try_get("section")?;
            let Ok(parsed) = section.parse::<SyncSection>() else {
                tracing::warn!(section = %section, "Skipping unknown preference section");
                continue;
            };
            preferences.set(parsed, preference_from_row(row)?);
        }

        tracing::trace!(sections = preferences.len(), "Loaded sync preferences");
        Ok(preferences)
    }

    /// Inserts or replaces the preference of one section
    pub async fn save_section(
        &self,
        section: SyncSection,
        preference: &SectionPreference,
    ) -> Result<(), CacheError> {
        let pairs = serde_json::to_string(preference.pairs())?;
        let start_at = preference.start().map(|dt| dt.to_rfc3339());
        let updated_at = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT OR REPLACE INTO sync_preferences \
             (section, pairs, start_at, updated_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(section.as_str())
        .bind(&pairs)
        .bind(&start_at)
        .bind(&updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(section = %section, pairs = %pairs, "Saved sync preference");
        Ok(())
    }

    /// Deletes the preference of one section, returning whether a row existed
    pub async fn remove_section(&self, section: SyncSection) -> Result<bool, CacheError> {
        let result = sqlx::query("DELETE FROM sync_preferences WHERE section = ?")
            .bind(section.as_str())
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        tracing::debug!(section = %section, removed, "Removed sync preference");
        Ok(removed)
    }

    /// Last time any section was written
    pub async fn last_updated(&self) -> Result<Option<DateTime<Utc>>, CacheError> {
        let value: Option<String> = sqlx::query_scalar("SELECT MAX(updated_at) FROM sync_preferences")
            .fetch_one(&self.pool)
            .await?;
        parse_optional_datetime(value)
    }
}

#[async_trait::async_trait]
impl ISyncPreferences for SqlitePreferenceRepository {
    async fn apply_persisted(&self) -> anyhow::Result<SyncPreferences> {
        let preferences = self.load().await?;
        self.applied.send_replace(preferences.clone());
        tracing::info!(
            sections = preferences.configured_sections().len(),
            "Applied persisted sync preferences"
        );
        Ok(preferences)
    }
}

// ============================================================================
// Row mapping
// ============================================================================

fn preference_from_row(row: &SqliteRow) -> Result<SectionPreference, CacheError> {
    let pairs_json: String = row.try_get("pairs")?;
    let pairs: Vec<String> = serde_json::from_str(&pairs_json)?;
    let start = parse_optional_datetime(row.try_get("start_at")?)?;

    SectionPreference::new(pairs, start)
        .map_err(|e| CacheError::SerializationError(format!("Stored preference rejected: {}", e)))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, CacheError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| {
            CacheError::SerializationError(format!("Failed to parse datetime '{}': {}", s, e))
        })
}

fn parse_optional_datetime(s: Option<String>) -> Result<Option<DateTime<Utc>>, CacheError> {
    match s {
        Some(ref val) if !val.is_empty() => parse_datetime(val).map(Some),
        _ => Ok(None),
    }
}
