//! Search command implementation.

use std::path::Path;

use anyhow::Result;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use owo_colors::OwoColorize;
use voltex_core::{Collection, ScanOptions};

use super::{open_collection, scan_options};
use crate::cli::ScanFlags;
use crate::config::Config;
use crate::prompter::CliPrompter;

/// Run the search command
pub fn run(dir: &Path, query: &str, limit: usize, config: &Config) -> Result<()> {
    let prompter = CliPrompter::stdio();
    let collection = open_collection(dir, search_options(config), &prompter)?;

    let exact = collection.search(query);
    if !exact.is_empty() {
        for title in exact {
            print_song(&collection, title);
        }
        return Ok(());
    }

    let ranked = fuzzy_search(&collection, query, limit);
    if ranked.is_empty() {
        println!("No songs matching \"{}\"", query);
        return Ok(());
    }

    eprintln!("No exact match, closest titles:");
    for (title, score) in ranked {
        print_song(&collection, title);
        eprintln!("    {}", format!("score={}", score).dimmed());
    }
    Ok(())
}

/// Scan options for a search: the configured defaults, snapshot allowed
pub fn search_options(config: &Config) -> ScanOptions {
    scan_options(ScanFlags::default(), config)
}

fn print_song(collection: &Collection, title: &str) {
    if let Some(song) = collection.get(title) {
        println!("{}  {}", song.title.bold(), song.dirname.display().dimmed());
    }
}

/// Titles fuzzily matching `query`, best first
pub fn fuzzy_search<'a>(collection: &'a Collection, query: &str, limit: usize) -> Vec<(&'a str, i64)> {
    let matcher = SkimMatcherV2::default();

    let mut scored: Vec<(&str, i64)> = collection
        .titles()
        .filter_map(|title| {
            matcher
                .fuzzy_match(title, query)
                .filter(|&score| score > 0)
                .map(|score| (title, score))
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    scored.truncate(limit);
    scored
}
