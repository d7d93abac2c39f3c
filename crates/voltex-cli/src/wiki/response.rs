//! MediaWiki API responses and how they map back to song titles.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::IgnoredAny;

/// Response to `action=query`
#[derive(Debug, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub query: Query,
}

#[derive(Debug, Default, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub normalized: Vec<TitleMapping>,
    #[serde(default)]
    pub redirects: Vec<TitleMapping>,
    #[serde(default)]
    pub pages: BTreeMap<String, Page>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TitleMapping {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
pub struct Page {
    pub title: String,
    #[serde(default)]
    pub missing: Option<IgnoredAny>,
}

/// Response to `action=parse`
#[derive(Debug, Deserialize)]
pub struct ParseResponse {
    #[serde(default)]
    pub error: Option<IgnoredAny>,
    #[serde(default)]
    pub parse: Option<Parsed>,
}

#[derive(Debug, Deserialize)]
pub struct Parsed {
    pub title: String,
    #[serde(default)]
    pub redirects: Vec<TitleMapping>,
    pub text: ParsedText,
}

#[derive(Debug, Deserialize)]
pub struct ParsedText {
    #[serde(rename = "*")]
    pub html: String,
}

/// Collapse redirect chains: `A -> B, B -> C` becomes `A -> C`.
///
/// Intermediate titles of a chain are dropped. Cycles stop at the first
/// repeated title.
pub fn resolve_redirects(redirects: &[TitleMapping]) -> BTreeMap<String, String> {
    let direct: BTreeMap<&str, &str> = redirects
        .iter()
        .map(|r| (r.from.as_str(), r.to.as_str()))
        .collect();
    let targets: Vec<&str> = direct.values().copied().collect();

    let mut resolved = BTreeMap::new();
    for &from in direct.keys() {
        if targets.contains(&from) {
            continue;
        }
        let mut target = direct[from];
        let mut seen = vec![from];
        while let Some(&next) = direct.get(target) {
            if seen.contains(&target) {
                break;
            }
            seen.push(target);
            target = next;
        }
        resolved.insert(from.to_string(), target.to_string());
    }
    resolved
}

/// Romanizations for a batch of titles.
///
/// `queried` pairs each original title with the title sent to the wiki. A
/// redirect means the target is the romanization; an existing page means the
/// title needs none; a missing page means nothing is known.
pub fn romanizations(
    response: &QueryResponse,
    queried: &[(String, String)],
) -> Vec<(String, Option<String>)> {
    let query = &response.query;
    let normalized: BTreeMap<&str, &str> = query
        .normalized
        .iter()
        .map(|n| (n.from.as_str(), n.to.as_str()))
        .collect();
    let redirects = resolve_redirects(&query.redirects);
    let existing: Vec<&str> = query
        .pages
        .values()
        .filter(|page| page.missing.is_none())
        .map(|page| page.title.as_str())
        .collect();

    queried
        .iter()
        .map(|(original, sent)| {
            let title = normalized.get(sent.as_str()).copied().unwrap_or(sent.as_str());
            let romanization = match redirects.get(title) {
                Some(target) => Some(target.clone()),
                None if existing.contains(&title) => Some(original.clone()),
                None => None,
            };
            (original.clone(), romanization)
        })
        .collect()
}

/// The first text node of `html` naming a known game, mapped to its directory name
pub fn find_game(html: &str, games: &BTreeMap<String, String>) -> Option<String> {
    text_nodes(html).find_map(|text| games.get(text.trim()).cloned())
}

/// Text between tags, in document order
fn text_nodes(html: &str) -> impl Iterator<Item = &str> {
    html.split('<')
        .filter_map(|chunk| chunk.split_once('>').map(|(_, text)| text))
        .filter(|text| !text.trim().is_empty())
}
