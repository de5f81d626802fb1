//! Formatted terminal output.
//!
//! Formatting lives in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized (important for future snapshot tests)
//!
//! A summary's row order is its ordering contract; tables render rows
//! exactly in the order the aggregator produced them.

use crate::domain::{ReportKind, Summary};
use crate::io::ingest::Dataset;

/// Format the dataset banner: source labels, KPI counts, coverage, and a
/// row-error note when normalization dropped anything.
pub fn format_dataset_summary(dataset: &Dataset) -> String {
    let mut out = String::new();
    let stats = &dataset.stats;

    out.push_str("=== pulse - Retail Sales Pipeline ===\n");
    out.push_str(&format!("Sources: {}\n", dataset.sources.join(", ")));
    out.push_str(&format!(
        "Rows: {} used / {} read\n",
        stats.rows, dataset.rows_read
    ));
    out.push_str(&format!(
        "Stores: {} | Families: {} | States: {} | Years: {}\n",
        stats.stores, stats.families, stats.states, stats.years
    ));
    out.push_str(&format!(
        "Coverage: {} .. {}\n",
        stats.first_month, stats.last_month
    ));

    if !dataset.row_errors.is_empty() {
        out.push_str(&format!(
            "Note: {} row(s) dropped during normalization (first: {}:{} {})\n",
            dataset.row_errors.len(),
            dataset.row_errors[0].source,
            dataset.row_errors[0].line,
            dataset.row_errors[0].message
        ));
    }

    out
}

/// Format one report as a titled fixed-width table.
pub fn format_summary_table(summary: &Summary) -> String {
    let mut out = String::new();
    let kind = summary.report;

    out.push_str(&format!("{}:\n", kind.title()));
    if summary.is_empty() {
        out.push_str("  (no rows)\n");
        return out;
    }

    let has_rank = summary.rows.iter().any(|r| r.rank.is_some());
    let derived = kind.derived_column();

    // Header + underline.
    let mut header = String::new();
    if has_rank {
        header.push_str(&format!("{:>5} ", "rank"));
    }
    header.push_str(&format!("{:<24} {:>16}", kind.key_column(), kind.value_column()));
    if let Some(name) = derived {
        header.push_str(&format!(" {name:>16}"));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    let mut rule = String::new();
    if has_rank {
        rule.push_str(&format!("{:-<5} ", ""));
    }
    rule.push_str(&format!("{:-<24} {:-<16}", "", ""));
    if derived.is_some() {
        rule.push_str(&format!(" {:-<16}", ""));
    }
    out.push_str(rule.trim_end());
    out.push('\n');

    for row in &summary.rows {
        let mut line = String::new();
        if has_rank {
            match row.rank {
                Some(rank) => line.push_str(&format!("{rank:>5} ")),
                None => line.push_str(&format!("{:>5} ", "")),
            }
        }
        line.push_str(&format!(
            "{:<24} {}",
            truncate(&row.label, 24),
            fmt_opt(row.value)
        ));
        if derived.is_some() {
            line.push_str(&format!(" {}", fmt_opt(row.derived)));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Format the report catalog for `pulse reports`.
pub fn format_report_catalog() -> String {
    let mut out = String::new();
    out.push_str("Available reports:\n");
    for kind in ReportKind::ALL {
        out.push_str(&format!("  {:<28} {}\n", kind.name(), kind.description()));
    }
    out
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:>16.2}"),
        _ => format!("{:>16}", "-"),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SummaryRow;

    #[test]
    fn table_headers_use_report_columns() {
        let summary = Summary::with_rows(
            ReportKind::TopProducts,
            vec![SummaryRow::new("GROCERY I", 1234.5)],
        );
        let text = format_summary_table(&summary);
        assert!(text.contains("family"));
        assert!(text.contains("total_sales"));
        assert!(text.contains("GROCERY I"));
        assert!(text.contains("1234.50"));
    }

    #[test]
    fn absent_values_render_as_dash() {
        let summary = Summary::with_rows(
            ReportKind::AvgSalesByWeekday,
            vec![
                SummaryRow::new("Monday", 10.0),
                SummaryRow::missing("Tuesday"),
            ],
        );
        let text = format_summary_table(&summary);
        let tuesday = text.lines().find(|l| l.starts_with("Tuesday")).unwrap();
        assert!(tuesday.trim_end().ends_with('-'));
    }

    #[test]
    fn derived_column_appears_for_pareto() {
        let summary = Summary::with_rows(
            ReportKind::ParetoStoreConcentration,
            vec![SummaryRow::new("1", 50.0).with_rank(1).with_derived(100.0)],
        );
        let text = format_summary_table(&summary);
        assert!(text.contains("cumulative_pct"));
        assert!(text.contains("rank"));
        assert!(text.contains("100.00"));
    }

    #[test]
    fn empty_summary_says_so() {
        let text = format_summary_table(&Summary::new(ReportKind::SalesByCity));
        assert!(text.contains("(no rows)"));
    }

    #[test]
    fn catalog_lists_every_kind() {
        let text = format_report_catalog();
        for kind in ReportKind::ALL {
            assert!(text.contains(kind.name()), "missing {}", kind.name());
        }
    }

    #[test]
    fn long_labels_truncate() {
        assert_eq!(truncate("Santo Domingo de los Tsachilas", 24), "Santo Domingo de los Ts.");
        assert_eq!(truncate("Quito", 24), "Quito");
    }
}
