//! CLI argument definitions for voltex.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "voltex")]
#[command(about = "K-Shoot MANIA chart collection manager", version)]
pub struct Args {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file (default: <config dir>/voltex/config.toml)
    #[arg(long, value_name = "FILE", global = true, env = "VOLTEX_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// How a collection is built
#[derive(ClapArgs, Debug, Clone, Copy, Default)]
pub struct ScanFlags {
    /// Do not collect effect audio referenced in chart bodies
    #[arg(long)]
    pub no_sfx: bool,

    /// Ignore an existing data.json snapshot and scan the directory tree
    #[arg(long)]
    pub rescan: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge two collections into a new output directory
    Merge {
        /// Collection to overlay the other
        #[arg(short, long, value_name = "DIR")]
        left: PathBuf,
        /// Collection to be overlaid; its directory layout is kept
        #[arg(short, long, value_name = "DIR")]
        right: PathBuf,
        /// Output directory for the merged collection
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,
        #[command(flatten)]
        scan: ScanFlags,
        /// Plan destinations without copying anything
        #[arg(long)]
        dry_run: bool,
        /// Read romanizations and games from a JSON file instead of RemyWiki
        #[arg(long, value_name = "FILE")]
        metadata: Option<PathBuf>,
    },
    /// Build a collection and show a summary
    Scan {
        /// Collection root
        dir: PathBuf,
        #[command(flatten)]
        scan: ScanFlags,
        /// Write the data.json snapshot at the collection root
        #[arg(long)]
        save: bool,
    },
    /// Search song titles in a collection
    Search {
        /// Collection root
        dir: PathBuf,
        /// Text to look for in song titles
        query: String,
        /// Maximum number of fuzzy matches to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}
