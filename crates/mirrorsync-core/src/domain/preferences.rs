//! Sync preferences
//!
//! Per-section selection of which trading pairs the mirror should carry and
//! from which point in time. Persisted by the cache crate and re-applied on
//! every login.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Report sections that participate in mirroring
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncSection {
    PublicTrades,
    Tickers,
    StatusMessages,
    Candles,
}

impl SyncSection {
    pub const ALL: [SyncSection; 4] = [
        SyncSection::PublicTrades,
        SyncSection::Tickers,
        SyncSection::StatusMessages,
        SyncSection::Candles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncSection::PublicTrades => "public_trades",
            SyncSection::Tickers => "tickers",
            SyncSection::StatusMessages => "status_messages",
            SyncSection::Candles => "candles",
        }
    }
}

impl fmt::Display for SyncSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncSection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|section| section.as_str() == normalized)
            .ok_or_else(|| DomainError::InvalidSection(s.to_string()))
    }
}

/// Pairs and start time selected for one section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPreference {
    pairs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<DateTime<Utc>>,
}

impl SectionPreference {
    /// Builds a preference, normalizing pairs to trimmed upper case
    ///
    /// Duplicates are dropped while keeping first-seen order; an empty
    /// symbol is rejected.
    pub fn new<I, S>(pairs: I, start: Option<DateTime<Utc>>) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for pair in pairs {
            let raw = pair.as_ref();
            let symbol = raw.trim().to_ascii_uppercase();
            if symbol.is_empty() {
                return Err(DomainError::InvalidPair(raw.to_string()));
            }
            if !normalized.contains(&symbol) {
                normalized.push(symbol);
            }
        }
        Ok(Self {
            pairs: normalized,
            start,
        })
    }

    pub fn pairs(&self) -> &[String] {
        &self.pairs
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    /// A section has a preference once at least one pair is selected
    pub fn is_configured(&self) -> bool {
        !self.pairs.is_empty()
    }
}

/// All section preferences, keyed by section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPreferences {
    sections: BTreeMap<SyncSection, SectionPreference>,
}

impl SyncPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, section: SyncSection) -> Option<&SectionPreference> {
        self.sections.get(&section)
    }

    pub fn set(&mut self, section: SyncSection, preference: SectionPreference) {
        self.sections.insert(section, preference);
    }

    pub fn remove(&mut self, section: SyncSection) -> Option<SectionPreference> {
        self.sections.remove(&section)
    }

    pub fn has_preference(&self, section: SyncSection) -> bool {
        self.get(section).is_some_and(SectionPreference::is_configured)
    }

    /// Sections with at least one pair, in declaration order
    pub fn configured_sections(&self) -> Vec<SyncSection> {
        self.sections
            .iter()
            .filter(|(_, pref)| pref.is_configured())
            .map(|(section, _)| *section)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SyncSection, &SectionPreference)> {
        self.sections.iter().map(|(s, p)| (*s, p))
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_section_parse() {
        assert_eq!(
            "public-trades".parse::<SyncSection>().unwrap(),
            SyncSection::PublicTrades
        );
        assert_eq!("Candles".parse::<SyncSection>().unwrap(), SyncSection::Candles);
        assert_eq!(
            "ledgers".parse::<SyncSection>(),
            Err(DomainError::InvalidSection("ledgers".to_string()))
        );
    }

    #[test]
    fn test_pairs_are_normalized_and_deduplicated() {
        let pref = SectionPreference::new([" btcusd", "ETHUSD", "BTCUSD "], None).unwrap();
        assert_eq!(pref.pairs(), ["BTCUSD", "ETHUSD"]);
        assert!(pref.is_configured());
    }

    #[test]
    fn test_empty_pair_is_rejected() {
        let err = SectionPreference::new(["BTCUSD", "  "], None).unwrap_err();
        assert_eq!(err, DomainError::InvalidPair("  ".to_string()));
    }

    #[test]
    fn test_has_preference_requires_pairs() {
        let mut prefs = SyncPreferences::new();
        prefs.set(SyncSection::Tickers, SectionPreference::default());
        prefs.set(
            SyncSection::Candles,
            SectionPreference::new(["BTCUSD"], Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()))
                .unwrap(),
        );

        assert!(!prefs.has_preference(SyncSection::Tickers));
        assert!(prefs.has_preference(SyncSection::Candles));
        assert!(!prefs.has_preference(SyncSection::PublicTrades));
        assert_eq!(prefs.configured_sections(), vec![SyncSection::Candles]);
        assert_eq!(prefs.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut prefs = SyncPreferences::new();
        prefs.set(
            SyncSection::Tickers,
            SectionPreference::new(["ETHEUR"], None).unwrap(),
        );
        assert!(prefs.remove(SyncSection::Tickers).is_some());
        assert!(prefs.is_empty());
    }
}
