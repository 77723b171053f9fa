//! Command-line parsing for the macro time machine.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! normalization and slicing code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::SettingsOverrides;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mtm", version, about = "Macro Time Machine: normalize and slice macro time series")]
pub struct Cli {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Data location overrides (otherwise environment / `.env`, then defaults).
#[derive(Debug, Args, Clone, Default)]
pub struct PathArgs {
    /// Directory holding raw indicator CSVs.
    #[arg(long, global = true, value_name = "DIR")]
    pub raw_dir: Option<PathBuf>,

    /// Directory for normalized series.
    #[arg(long, global = true, value_name = "DIR")]
    pub processed_dir: Option<PathBuf>,

    /// Catalog CSV path.
    #[arg(long, global = true, value_name = "CSV")]
    pub catalog: Option<PathBuf>,

    /// JSON indicator registry (defaults to the built-in indicator set).
    #[arg(long, global = true, value_name = "JSON")]
    pub registry: Option<PathBuf>,
}

impl PathArgs {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            raw_dir: self.raw_dir.clone(),
            processed_dir: self.processed_dir.clone(),
            catalog_path: self.catalog.clone(),
            registry_path: self.registry.clone(),
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize raw files to month-end series and rebuild the catalog.
    Build(SelectArgs),
    /// Show the catalog of ready indicators (rebuilt if missing or stale).
    Catalog(CatalogArgs),
    /// Slice one indicator by trailing window or month range.
    Slice(SliceArgs),
    /// List the indicator registry.
    Indicators,
    /// Download raw files from FRED (needs FRED_API_KEY).
    Fetch(SelectArgs),
}

#[derive(Debug, Args, Clone)]
pub struct SelectArgs {
    /// Only process these indicator ids (repeatable). Default: all.
    #[arg(long = "only", value_name = "ID")]
    pub only: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct CatalogArgs {
    /// Only show one category (case-insensitive).
    #[arg(long)]
    pub category: Option<String>,

    /// Rebuild even if the catalog looks fresh.
    #[arg(long)]
    pub rebuild: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SliceArgs {
    /// Indicator id (see `mtm catalog`).
    pub indicator: String,

    /// Trailing window: 1Y, 3Y, 5Y, 10Y, 20Y or 30Y.
    #[arg(short, long)]
    pub window: Option<String>,

    /// First month (YYYY-MM); defaults to the first available month.
    #[arg(long, value_name = "YYYY-MM")]
    pub start: Option<String>,

    /// Last month (YYYY-MM), included in full; defaults to the last available month.
    #[arg(long, value_name = "YYYY-MM")]
    pub end: Option<String>,

    /// Export rows (Date, Value, ChangePct) to CSV.
    #[arg(long, value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// Export the full slice (rows, summary, profile) to JSON.
    #[arg(long, value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_arguments_parse() {
        let cli = Cli::try_parse_from(["mtm", "slice", "vix", "--window", "5Y", "--processed-dir", "/tmp/p"]).unwrap();
        assert_eq!(cli.paths.processed_dir, Some(PathBuf::from("/tmp/p")));
        let Command::Slice(args) = cli.command else {
            panic!("expected slice");
        };
        assert_eq!(args.indicator, "vix");
        assert_eq!(args.window.as_deref(), Some("5Y"));
        assert!(args.start.is_none());
    }

    #[test]
    fn build_accepts_repeated_only() {
        let cli = Cli::try_parse_from(["mtm", "-vv", "build", "--only", "vix", "--only", "dxy"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.only, vec!["vix", "dxy"]);
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["mtm"]).is_err());
    }
}
