//! User configuration, read from a TOML file.
//!
//! ```toml
//! [wiki]
//! endpoint = "https://remywiki.com/api.php"
//! timeout_secs = 30
//! batch_size = 50
//!
//! [wiki.title_overrides]
//! "I" = "I (Chroma)"
//!
//! [wiki.games]
//! "SOUND VOLTEX EXCEED GEAR" = "SDVX Exceed Gear"
//!
//! [scan]
//! include_sfx = true
//! ```
//!
//! Tables given in the file replace the built-in ones entirely.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use voltex_core::config::metadata::DEFAULT_BATCH_SIZE;

pub const DEFAULT_ENDPOINT: &str = "https://remywiki.com/api.php";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Titles the wiki cannot look up as written, and what to query instead
const TITLE_OVERRIDES: [(&str, &str); 6] = [
    ("XXanadu#climaXX", "XXanadu climaXX"),
    ("#EmoCloche", "EmoCloche"),
    ("うぇるかむ -||祭みっくす||-", "VVelcome -matsuri mix-"),
    ("I", "I (Chroma)"),
    ("gigadelic(m3rkAb4# R3m!x)", "Gigadelic(m3rkAb4h R3m!x)"),
    ("[ ]DENTITY", "IDENTITY"),
];

/// Game names as written on the wiki, and their output directory names
const GAMES: [(&str, &str); 6] = [
    ("SOUND VOLTEX BOOTH", "SDVX BOOTH"),
    ("SOUND VOLTEX II -infinite infection-", "SDVX Infinite Infection"),
    ("SOUND VOLTEX III GRAVITY WARS", "SDVX Gravity Wars"),
    ("SOUND VOLTEX IV HEAVENLY HAVEN", "SDVX Heavenly Haven"),
    ("SOUND VOLTEX VIVID WAVE", "SDVX Vivid Wave"),
    ("SOUND VOLTEX EXCEED GEAR", "SDVX Exceed Gear"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub wiki: WikiConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub batch_size: usize,
    pub title_overrides: BTreeMap<String, String>,
    pub games: BTreeMap<String, String>,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            batch_size: DEFAULT_BATCH_SIZE,
            title_overrides: to_map(&TITLE_OVERRIDES),
            games: to_map(&GAMES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub include_sfx: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { include_sfx: true }
    }
}

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Config {
    /// Default config file location, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("voltex").join("config.toml"))
    }

    /// Load `path`, or the default location when `None`.
    ///
    /// A missing default file yields the defaults; an explicitly given file
    /// must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file {:?}", path))
    }
}
