//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod merge;
pub mod scan;
pub mod search;

use std::path::Path;

use anyhow::{Context, Result};
use voltex_core::{Collection, ScanOptions, TitleResolver, TracingSink};

use crate::cli::ScanFlags;
use crate::config::Config;

pub fn scan_options(flags: ScanFlags, config: &Config) -> ScanOptions {
    ScanOptions {
        include_sfx: config.scan.include_sfx && !flags.no_sfx,
        use_snapshot: !flags.rescan,
    }
}

/// Open a collection, from its snapshot when allowed
pub fn open_collection(
    dir: &Path,
    options: ScanOptions,
    resolver: &dyn TitleResolver,
) -> Result<Collection> {
    Collection::open(dir, options, resolver, &TracingSink)
        .with_context(|| format!("Failed to open collection at {:?}", dir))
}
