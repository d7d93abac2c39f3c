//! Merge command implementation.
//!
//! Builds both collections, saves a snapshot for each one that had none, then
//! places every song in the output directory and copies it there.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use tracing::{info, warn};
use voltex_core::{
    Collection, MergeDriver, MergePlan, MergeReport, MetadataSource, StaticMetadata, TracingSink,
};

use super::{open_collection, scan_options};
use crate::cli::ScanFlags;
use crate::config::Config;
use crate::prompter::CliPrompter;
use crate::wiki::RemyWiki;

pub struct MergeArgs {
    pub left: PathBuf,
    pub right: PathBuf,
    pub output: PathBuf,
    pub scan: ScanFlags,
    pub dry_run: bool,
    pub metadata: Option<PathBuf>,
}

/// Run the merge command
pub fn run(args: MergeArgs, config: &Config) -> Result<()> {
    for dir in [&args.left, &args.right] {
        if !dir.is_dir() {
            bail!("{:?} is not a directory", dir);
        }
    }

    let prompter = CliPrompter::stdio();
    let options = scan_options(args.scan, config);

    info!("Initializing left collection");
    let left = open_collection(&args.left, options, &prompter)?;
    info!("Initializing right collection");
    let right = open_collection(&args.right, options, &prompter)?;

    for collection in [&left, &right] {
        save_if_missing(collection);
    }

    let metadata: Box<dyn MetadataSource> = match &args.metadata {
        Some(path) => Box::new(
            StaticMetadata::load(path)
                .with_context(|| format!("Failed to load metadata file {:?}", path))?,
        ),
        None => Box::new(RemyWiki::new(&config.wiki)),
    };

    let driver = MergeDriver::new(&args.output, metadata.as_ref(), &prompter, &TracingSink)
        .batch_size(config.wiki.batch_size);
    let plan = driver.plan(&left, &right);

    if args.dry_run {
        println!("{}", format_plan(&plan, driver.output()));
        return Ok(());
    }

    let report = driver.execute(&plan, &left, &right);
    println!("{}", format_report(&report));
    Ok(())
}

/// Keep a snapshot so a failed merge does not have to rescan
fn save_if_missing(collection: &Collection) {
    if collection.snapshot_path().exists() {
        return;
    }
    if let Err(e) = collection.save_snapshot(&TracingSink) {
        warn!("Failed to save snapshot for {:?}: {}", collection.path(), e);
    }
}

pub fn format_plan(plan: &MergePlan, output: &Path) -> String {
    let mut lines = vec![format!(
        "{} songs planned into {}",
        plan.placements.len().bold(),
        output.display()
    )];
    for placement in &plan.placements {
        let dest = placement
            .destination
            .strip_prefix(output)
            .unwrap_or(&placement.destination);
        lines.push(format!(
            "  [{}] {} -> {}",
            placement.origin,
            placement.title,
            dest.display()
        ));
    }
    for unresolved in &plan.unresolved {
        lines.push(format!(
            "  {} {}: {}",
            "unresolved".red(),
            unresolved.title,
            unresolved.reason
        ));
    }
    lines.join("\n")
}

pub fn format_report(report: &MergeReport) -> String {
    let mut lines = vec![
        format!("{}", "Merge complete".green().bold()),
        format!(
            "  songs: {} shared, {} right only, {} left only",
            report.shared, report.right_only, report.left_only
        ),
        format!(
            "  files: {} copied, {} already present",
            report.copied, report.skipped
        ),
        format!("  top difficulty charts merged: {}", report.merged),
    ];
    if !report.unmergeable.is_empty() {
        lines.push(format!(
            "  left copy kept for {} shared songs",
            report.unmergeable.len()
        ));
    }
    if !report.unresolved.is_empty() {
        lines.push(format!(
            "  {} {}",
            "not placed:".yellow(),
            report.unresolved.join(", ")
        ));
    }
    for (title, reason) in &report.failed {
        lines.push(format!("  {} {}: {}", "failed:".red(), title, reason));
    }
    lines.join("\n")
}
