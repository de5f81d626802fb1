//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - builds the data-source provider
//! - opens the dataset session
//! - computes the requested view or report
//! - prints tables / writes optional exports

use clap::Parser;

use crate::cli::{Cli, Command, ReportArgs, SourceArgs, StateArgs, StoreArgs};
use crate::data::{LocalFiles, RemoteDownload, SourceProvider};
use crate::domain::{ReportKind, RowFilter};
use crate::error::AppError;
use crate::report::format;

pub mod pipeline;

use pipeline::Session;

/// Entry point for the `pulse` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Overview(args) => handle_overview(args),
        Command::Store(args) => handle_store(args),
        Command::State(args) => handle_state(args),
        Command::Insights(args) => handle_insights(args),
        Command::Report(args) => handle_report(args),
        Command::Reports => {
            print!("{}", format::format_report_catalog());
            Ok(())
        }
    }
}

/// Resolve the source arguments into a provider.
///
/// Priority: explicit remote flag, then explicit file list, then a scan of
/// the data directory.
pub fn provider_from_args(args: &SourceArgs) -> Result<Box<dyn SourceProvider>, AppError> {
    if args.remote {
        let provider = match &args.base_url {
            Some(url) => RemoteDownload::new(url.clone(), args.parts.clone()),
            None => RemoteDownload::from_env(args.parts.clone())?,
        };
        return Ok(Box::new(provider));
    }
    if !args.files.is_empty() {
        return Ok(Box::new(LocalFiles::new(args.files.clone())));
    }
    Ok(Box::new(LocalFiles::discover(&args.data_dir)?))
}

fn open_session(args: &SourceArgs) -> Result<Session, AppError> {
    let provider = provider_from_args(args)?;
    Session::open(provider.as_ref())
}

fn handle_overview(args: SourceArgs) -> Result<(), AppError> {
    let session = open_session(&args)?;
    let view = pipeline::overview(session.dataset())?;

    print!("{}", format::format_dataset_summary(session.dataset()));
    println!();
    println!("{}", format::format_summary_table(&view.top_products));
    println!("{}", format::format_summary_table(&view.sales_by_store));
    println!("{}", format::format_summary_table(&view.top_promo_stores));
    println!("{}", format::format_summary_table(&view.weekday));
    println!("{}", format::format_summary_table(&view.weekly));
    print!("{}", format::format_summary_table(&view.monthly));
    Ok(())
}

fn handle_store(args: StoreArgs) -> Result<(), AppError> {
    let session = open_session(&args.source)?;
    let view = pipeline::store_view(session.dataset(), args.store_nbr)?;

    println!("=== Store {} ===", view.store_nbr);
    println!("Records: {}", view.records);
    println!("Promoted records: {}", view.promo_records);
    println!();
    print!("{}", format::format_summary_table(&view.yearly_sales));
    Ok(())
}

fn handle_state(args: StateArgs) -> Result<(), AppError> {
    let session = open_session(&args.source)?;
    let view = pipeline::state_view(session.dataset(), &args.state)?;

    println!("=== State {} ===", view.state);
    println!();
    println!("{}", format::format_summary_table(&view.yearly_transactions));
    println!("{}", format::format_summary_table(&view.store_ranking));
    println!("{}", format::format_summary_table(&view.top_product));
    print!("{}", format::format_summary_table(&view.sales_by_family));
    Ok(())
}

fn handle_insights(args: SourceArgs) -> Result<(), AppError> {
    let session = open_session(&args)?;
    let view = pipeline::insights(session.dataset())?;

    println!("{}", format::format_summary_table(&view.sales_by_city));
    println!("{}", format::format_summary_table(&view.top_bottom_states));
    println!("{}", format::format_summary_table(&view.pareto));
    println!("{}", format::format_summary_table(&view.promo_split));
    print!("{}", format::format_summary_table(&view.yearly_growth));
    Ok(())
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    // Resolve the report name before touching any data, so a typo fails
    // fast and cheap.
    let kind = ReportKind::from_name(&args.name)?;
    let filter = match (&args.store, &args.state) {
        (Some(store), _) => Some(RowFilter::Store(*store)),
        (None, Some(state)) => Some(RowFilter::State(state.clone())),
        (None, None) => None,
    };

    let session = open_session(&args.source)?;
    let summary = crate::report::aggregate(session.dataset().records(), kind, filter.as_ref())?;

    print!("{}", format::format_summary_table(&summary));

    if let Some(path) = &args.export {
        crate::io::export::write_summary_csv(path, &summary)?;
    }
    if let Some(path) = &args.export_json {
        crate::io::export::write_summary_json(path, &summary)?;
    }

    Ok(())
}
