//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs logging
//! - resolves settings and the indicator registry
//! - dispatches to the build / catalog / slice / fetch workflows
//! - prints reports and writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::catalog::{ensure_catalog, filter_by_category, rebuild_catalog};
use crate::cli::{CatalogArgs, Cli, Command, SelectArgs, SliceArgs};
use crate::config::Settings;
use crate::error::MtmError;
use crate::io::series::SeriesStore;
use crate::registry::IndicatorRegistry;
use crate::slice::{QueryWindow, SliceQuery, slice_indicator};

pub mod pipeline;

/// Entry point for the `mtm` binary.
pub fn run() -> Result<(), MtmError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::from_env(cli.paths.overrides());
    let registry = IndicatorRegistry::load(settings.registry_path.as_deref())?;
    tracing::debug!(?settings, indicators = registry.len(), "settings resolved");

    match cli.command {
        Command::Build(args) => handle_build(&settings, &registry, &args),
        Command::Catalog(args) => handle_catalog(&settings, &registry, &args),
        Command::Slice(args) => handle_slice(&settings, &registry, &args),
        Command::Indicators => {
            print!("{}", crate::report::format_indicators(&registry));
            Ok(())
        }
        Command::Fetch(args) => handle_fetch(&settings, &registry, &args),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Logs go to stderr so stdout stays clean for reports.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_build(settings: &Settings, registry: &IndicatorRegistry, args: &SelectArgs) -> Result<(), MtmError> {
    let report = pipeline::run_build(settings, registry, &args.only)?;
    print!("{}", crate::report::format_build_report(&report));
    Ok(())
}

fn handle_catalog(settings: &Settings, registry: &IndicatorRegistry, args: &CatalogArgs) -> Result<(), MtmError> {
    let store = SeriesStore::new(&settings.processed_dir);
    let entries = if args.rebuild {
        rebuild_catalog(registry, &store, &settings.catalog_path)?
    } else {
        ensure_catalog(registry, &store, &settings.catalog_path)?.0
    };

    let shown: Vec<_> = match &args.category {
        Some(category) => filter_by_category(&entries, category),
        None => entries.iter().collect(),
    };
    print!("{}", crate::report::format_catalog(&shown));
    Ok(())
}

fn handle_slice(settings: &Settings, registry: &IndicatorRegistry, args: &SliceArgs) -> Result<(), MtmError> {
    let window = QueryWindow::from_parts(args.window.as_deref(), args.start.as_deref(), args.end.as_deref())?;
    let query = SliceQuery::new(args.indicator.clone(), window);
    let store = SeriesStore::new(&settings.processed_dir);
    let result = slice_indicator(&store, registry, &query)?;

    let display = registry
        .get(&args.indicator)
        .map_or(args.indicator.as_str(), |d| d.display.as_str());
    print!("{}", crate::report::format_slice(&result, display, settings.ai_enabled));

    if let Some(path) = &args.export_csv {
        crate::io::export::write_slice_csv(path, &result)?;
    }
    if let Some(path) = &args.export_json {
        crate::io::export::write_slice_json(path, &result)?;
    }
    Ok(())
}

fn handle_fetch(settings: &Settings, registry: &IndicatorRegistry, args: &SelectArgs) -> Result<(), MtmError> {
    let client = crate::data::FredClient::from_env()?;
    let runs = pipeline::run_fetch(&client, settings, registry, &args.only)?;
    print!("{}", crate::report::format_fetch_report(&runs));
    Ok(())
}
