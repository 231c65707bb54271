use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use st_cli::commands::{report, sessions};
use st_cli::{Cli, Commands, Config};
use st_source::{JsonSource, MemoResolver, TableResolver};

/// Builds the file-backed source from CLI flags, falling back to config.
fn open_source(
    config: &Config,
    events: Option<&Path>,
    totals: Option<&Path>,
) -> JsonSource {
    let events_path = events.map_or_else(|| config.events_path.clone(), Path::to_path_buf);
    let totals_path = totals.map_or_else(|| config.totals_path.clone(), Path::to_path_buf);
    tracing::debug!(?events_path, ?totals_path, "opening source");
    JsonSource::new(events_path, totals_path)
}

/// Builds the display-name resolver; an absent table falls back to raw
/// package IDs.
fn open_resolver(
    config: &Config,
    names: Option<&Path>,
) -> Result<MemoResolver<TableResolver>> {
    let names_path: Option<PathBuf> =
        names.map_or_else(|| config.names_path.clone(), |p| Some(p.to_path_buf()));
    let table = match names_path {
        Some(path) => TableResolver::from_file(&path)
            .with_context(|| format!("failed to load name table {}", path.display()))?,
        None => TableResolver::default(),
    };
    Ok(MemoResolver::new(table))
}

fn effective_date(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    match &cli.command {
        Some(Commands::Report {
            events,
            totals,
            names,
            date,
            json,
        }) => {
            let source = open_source(&config, events.as_deref(), totals.as_deref());
            let resolver = open_resolver(&config, names.as_deref())?;
            report::run(&source, &resolver, effective_date(*date), *json)?;
        }
        Some(Commands::Sessions { events, date, json }) => {
            let source = open_source(&config, events.as_deref(), None);
            sessions::run(&source, effective_date(*date), *json)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
