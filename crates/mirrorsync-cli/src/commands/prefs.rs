//! Prefs commands - Edit persisted sync preferences
//!
//! Writes go straight to the preference database; the daemon picks them
//! up on the next login.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use mirrorsync_cache::{DatabasePool, SqlitePreferenceRepository};
use mirrorsync_core::domain::{SectionPreference, SyncPreferences, SyncSection};
use serde_json::{json, Value};
use tracing::info;

use super::CliContext;

#[derive(Debug, Subcommand)]
pub enum PrefsCommand {
    /// List stored preferences
    List,
    /// Set the pairs (and optional start time) of one section
    Set {
        /// public-trades, tickers, status-messages or candles
        section: SyncSection,
        /// Trading pairs, e.g. BTCUSD ETHUSD
        #[arg(required = true)]
        pairs: Vec<String>,
        /// Mirror from this RFC 3339 timestamp onwards
        #[arg(long)]
        start: Option<DateTime<Utc>>,
    },
    /// Remove the preference of one section
    Remove {
        section: SyncSection,
    },
}

impl PrefsCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config = ctx.load_config();

        let pool = DatabasePool::new(&config.storage.database)
            .await
            .context("Failed to open preference database")?;
        let repo = SqlitePreferenceRepository::new(pool.pool().clone());

        match self {
            PrefsCommand::List => {
                let prefs = repo.load().await?;
                if ctx.is_json() {
                    formatter.print_json(&prefs_json(&prefs));
                } else if prefs.is_empty() {
                    formatter.info("No sync preferences stored");
                } else {
                    for (section, pref) in prefs.iter() {
                        let since = pref
                            .start()
                            .map(|dt| format!(" since {}", dt.to_rfc3339()))
                            .unwrap_or_default();
                        formatter.field(section.as_str(), &format!("{}{}", pref.pairs().join(", "), since));
                    }
                }
            }
            PrefsCommand::Set {
                section,
                pairs,
                start,
            } => {
                let pref = SectionPreference::new(pairs, *start)?;
                repo.save_section(*section, &pref).await?;
                info!(section = %section, "Preference stored");
                formatter.success(&format!("{}: {}", section, pref.pairs().join(", ")));
            }
            PrefsCommand::Remove { section } => {
                if repo.remove_section(*section).await? {
                    formatter.success(&format!("Removed {}", section));
                } else {
                    formatter.warn(&format!("No preference stored for {}", section));
                }
            }
        }

        pool.close().await;
        Ok(())
    }
}

fn prefs_json(prefs: &SyncPreferences) -> Value {
    let sections: serde_json::Map<String, Value> = prefs
        .iter()
        .map(|(section, pref)| {
            (
                section.to_string(),
                json!({
                    "pairs": pref.pairs(),
                    "start": pref.start().map(|dt| dt.to_rfc3339()),
                }),
            )
        })
        .collect();
    Value::Object(sections)
}
