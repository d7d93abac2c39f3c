//! External song metadata used to place songs in a merged collection.
//!
//! A [`MetadataSource`] answers romanization and base game queries; a
//! [`MetadataFallback`] is asked when the source has no answer.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Romanized title and base game of one song, either may be unknown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameInfo {
    pub romanization: Option<String>,
    /// Output directory name of the game the song first appeared in
    pub game: Option<String>,
}

/// Source of song metadata, queried from several threads at once
pub trait MetadataSource: Sync {
    /// Romanize a batch of titles.
    ///
    /// Returns `(original title, romanization)` pairs. Titles missing from the
    /// result are treated as having no romanization.
    fn romanize_batch(&self, titles: &[String]) -> Result<Vec<(String, Option<String>)>>;

    fn lookup_game(&self, title: &str) -> Result<GameInfo>;
}

/// Asked for a value the metadata source could not provide.
///
/// Returning `None` leaves the song unplaced.
pub trait MetadataFallback {
    fn romanization(&self, title: &str) -> Option<String>;
    fn game(&self, title: &str) -> Option<String>;
}

/// Declines every request
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

impl MetadataFallback for NoFallback {
    fn romanization(&self, _title: &str) -> Option<String> {
        None
    }

    fn game(&self, _title: &str) -> Option<String> {
        None
    }
}

/// Metadata from fixed tables, loadable from a JSON file:
///
/// ```json
/// { "romanizations": { "極圏": "Kyokuken" }, "games": { "極圏": "SDVX Booth" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticMetadata {
    pub romanizations: BTreeMap<String, String>,
    pub games: BTreeMap<String, String>,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let data = serde_json::from_str(&content)?;
        Ok(data)
    }

    pub fn with_romanization(mut self, title: &str, romanization: &str) -> Self {
        self.romanizations
            .insert(title.to_string(), romanization.to_string());
        self
    }

    pub fn with_game(mut self, title: &str, game: &str) -> Self {
        self.games.insert(title.to_string(), game.to_string());
        self
    }
}

impl MetadataSource for StaticMetadata {
    fn romanize_batch(&self, titles: &[String]) -> Result<Vec<(String, Option<String>)>> {
        Ok(titles
            .iter()
            .map(|title| (title.clone(), self.romanizations.get(title).cloned()))
            .collect())
    }

    fn lookup_game(&self, title: &str) -> Result<GameInfo> {
        Ok(GameInfo {
            romanization: self.romanizations.get(title).cloned(),
            game: self.games.get(title).cloned(),
        })
    }
}
