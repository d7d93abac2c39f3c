mod cli;
mod commands;
mod config;
mod prompter;
mod wiki;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Command};
use config::Config;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("voltex={level},voltex_core={level}")));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Merge {
            left,
            right,
            output,
            scan,
            dry_run,
            metadata,
        } => commands::merge::run(
            commands::merge::MergeArgs {
                left,
                right,
                output,
                scan,
                dry_run,
                metadata,
            },
            &config,
        ),
        Command::Scan { dir, scan, save } => commands::scan::run(&dir, scan, save, &config),
        Command::Search { dir, query, limit } => commands::search::run(&dir, &query, limit, &config),
    }
}
