//! Command-line parsing for the sales analytics pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the normalization/aggregation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pulse", version, about = "Retail sales analytics pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the global overview: KPIs, top products, store distribution, seasonality.
    Overview(SourceArgs),
    /// Drill into one store: record counts and yearly sales.
    Store(StoreArgs),
    /// Drill into one state: transactions, store ranking, product mix.
    State(StateArgs),
    /// Print the executive view: concentration, promotions, growth.
    Insights(SourceArgs),
    /// Compute a single report by name, optionally exporting it.
    Report(ReportArgs),
    /// List the available report kinds.
    Reports,
}

/// Where the dataset comes from. Shared by every data-bearing subcommand.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Directory scanned for CSV parts (ignored when --file is given).
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Explicit CSV part file; repeat for multiple parts.
    #[arg(long = "file")]
    pub files: Vec<PathBuf>,

    /// Download the parts over HTTP instead of reading local files.
    #[arg(long)]
    pub remote: bool,

    /// Base URL for --remote (defaults to $SALES_DATA_BASE_URL).
    #[arg(long)]
    pub base_url: Option<String>,

    /// Remote part file name; repeat for multiple parts.
    #[arg(long = "part")]
    pub parts: Vec<String>,
}

/// Options for the store drill-down.
#[derive(Debug, Args)]
pub struct StoreArgs {
    /// Store number to drill into.
    pub store_nbr: u32,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Options for the state drill-down.
#[derive(Debug, Args)]
pub struct StateArgs {
    /// State name, matched exactly.
    pub state: String,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Options for running a single report.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Report name (see `pulse reports`).
    pub name: String,

    /// Restrict to one store before aggregating.
    #[arg(long)]
    pub store: Option<u32>,

    /// Restrict to one state before aggregating (exact match).
    #[arg(long, conflicts_with = "store")]
    pub state: Option<String>,

    /// Export the summary to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the summary to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_subcommand_parses_filters_and_exports() {
        let cli = Cli::try_parse_from([
            "pulse",
            "report",
            "top_products",
            "--state",
            "Pichincha",
            "--export",
            "out.csv",
        ])
        .unwrap();

        let Command::Report(args) = cli.command else {
            panic!("expected report subcommand");
        };
        assert_eq!(args.name, "top_products");
        assert_eq!(args.state.as_deref(), Some("Pichincha"));
        assert_eq!(args.export.as_deref(), Some(std::path::Path::new("out.csv")));
        assert!(args.store.is_none());
    }

    #[test]
    fn store_and_state_filters_conflict() {
        let result = Cli::try_parse_from([
            "pulse",
            "report",
            "sales_by_store",
            "--store",
            "1",
            "--state",
            "Azuay",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn source_args_default_to_local_data_dir() {
        let cli = Cli::try_parse_from(["pulse", "overview"]).unwrap();
        let Command::Overview(args) = cli.command else {
            panic!("expected overview subcommand");
        };
        assert_eq!(args.data_dir, PathBuf::from("data"));
        assert!(!args.remote);
        assert!(args.files.is_empty());
    }
}
