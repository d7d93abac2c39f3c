//! RemyWiki metadata client.
//!
//! Romanizations come from batched title queries following redirects; the
//! base game comes from the rendered page of a song.

mod response;

pub use response::*;

use std::collections::BTreeMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;
use voltex_core::{Error, GameInfo, MetadataSource, Result};

use crate::config::WikiConfig;

pub struct RemyWiki {
    agent: ureq::Agent,
    endpoint: String,
    title_overrides: BTreeMap<String, String>,
    games: BTreeMap<String, String>,
}

impl RemyWiki {
    pub fn new(config: &WikiConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        Self {
            agent: agent_config.into(),
            endpoint: config.endpoint.clone(),
            title_overrides: config.title_overrides.clone(),
            games: config.games.clone(),
        }
    }

    /// Title to send to the wiki for `title`
    fn query_title<'a>(&'a self, title: &'a str) -> &'a str {
        self.title_overrides
            .get(title)
            .map(String::as_str)
            .unwrap_or(title)
    }

    fn get<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T> {
        let mut response = self
            .agent
            .get(&self.endpoint)
            .query_pairs(params.iter().copied())
            .call()
            .map_err(|e| Error::Metadata(format!("request to {} failed: {}", self.endpoint, e)))?;
        response
            .body_mut()
            .read_json()
            .map_err(|e| Error::Metadata(format!("invalid response from {}: {}", self.endpoint, e)))
    }
}

impl MetadataSource for RemyWiki {
    fn romanize_batch(&self, titles: &[String]) -> Result<Vec<(String, Option<String>)>> {
        let queried: Vec<(String, String)> = titles
            .iter()
            .map(|title| (title.clone(), self.query_title(title).to_string()))
            .collect();
        let joined = queried
            .iter()
            .map(|(_, sent)| sent.as_str())
            .collect::<Vec<_>>()
            .join("|");

        debug!("Querying {} titles", queried.len());
        let response: QueryResponse = self.get(&[
            ("action", "query"),
            ("titles", &joined),
            ("redirects", "1"),
            ("format", "json"),
        ])?;

        Ok(romanizations(&response, &queried))
    }

    fn lookup_game(&self, title: &str) -> Result<GameInfo> {
        let response: ParseResponse = self.get(&[
            ("action", "parse"),
            ("page", self.query_title(title)),
            ("prop", "text"),
            ("redirects", "1"),
            ("format", "json"),
        ])?;

        let parsed = match response.parse {
            Some(parsed) if response.error.is_none() => parsed,
            _ => {
                debug!("No wiki page for {}", title);
                return Ok(GameInfo::default());
            }
        };

        let romanization = resolve_redirects(&parsed.redirects)
            .into_values()
            .next()
            .unwrap_or_else(|| title.to_string());
        debug!("Page {} found for {}", parsed.title, title);

        Ok(GameInfo {
            romanization: Some(romanization),
            game: find_game(&parsed.text.html, &self.games),
        })
    }
}
