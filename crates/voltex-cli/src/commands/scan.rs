//! Scan command implementation.
//!
//! Builds a collection and prints what it contains per difficulty.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use strum::IntoEnumIterator;
use voltex_core::{Collection, Difficulty, TracingSink};

use super::{open_collection, scan_options};
use crate::cli::ScanFlags;
use crate::config::Config;
use crate::prompter::CliPrompter;

/// Run the scan command
pub fn run(dir: &Path, flags: ScanFlags, save: bool, config: &Config) -> Result<()> {
    let prompter = CliPrompter::stdio();
    let collection = open_collection(dir, scan_options(flags, config), &prompter)?;

    println!("{}", format_summary(&collection));

    if save {
        let path = collection
            .save_snapshot(&TracingSink)
            .context("Failed to save snapshot")?;
        println!("Snapshot written to {}", path.display());
    }

    Ok(())
}

/// Song and chart counts of a collection
pub fn format_summary(collection: &Collection) -> String {
    let mut lines = vec![format!(
        "{} songs in {}",
        collection.len().bold(),
        collection.path().display()
    )];

    for difficulty in Difficulty::iter() {
        let charts = collection
            .iter()
            .filter(|(_, song)| song.charts.contains(difficulty))
            .count();
        lines.push(format!("  {}: {}", colored_difficulty(difficulty), charts));
    }

    let promoted = collection
        .iter()
        .filter_map(|(_, song)| song.charts.get(Difficulty::TOP))
        .filter(|chart| chart.custom_path)
        .count();
    if promoted > 0 {
        lines.push(format!(
            "  {} {} charts from other directories",
            promoted,
            Difficulty::TOP.short_name()
        ));
    }

    lines.join("\n")
}

pub fn colored_difficulty(difficulty: Difficulty) -> String {
    let name = difficulty.short_name();
    match difficulty {
        Difficulty::Light => name.magenta().to_string(),
        Difficulty::Challenge => name.yellow().to_string(),
        Difficulty::Extended => name.red().to_string(),
        Difficulty::Infinite => name.white().bold().to_string(),
    }
}
