//! Export report summaries to CSV or JSON.
//!
//! Exports are meant to be easy to consume in spreadsheets or downstream
//! scripts: column names come from the report's own strategy metadata, and
//! rows keep the report's ordering.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::Summary;
use crate::error::AppError;

/// Write a summary to a CSV file.
pub fn write_summary_csv(path: &Path, summary: &Summary) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::export(format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    let kind = summary.report;
    let has_rank = summary.rows.iter().any(|r| r.rank.is_some());

    let mut header = String::new();
    if has_rank {
        header.push_str("rank,");
    }
    header.push_str(kind.key_column());
    header.push(',');
    header.push_str(kind.value_column());
    if let Some(name) = kind.derived_column() {
        header.push(',');
        header.push_str(name);
    }
    writeln!(file, "{header}")
        .map_err(|e| AppError::export(format!("Failed to write export CSV header: {e}")))?;

    for row in &summary.rows {
        let mut line = String::new();
        if has_rank {
            if let Some(rank) = row.rank {
                line.push_str(&rank.to_string());
            }
            line.push(',');
        }
        line.push_str(&csv_cell(&row.label));
        line.push(',');
        line.push_str(&fmt_cell(row.value));
        if kind.derived_column().is_some() {
            line.push(',');
            line.push_str(&fmt_cell(row.derived));
        }
        writeln!(file, "{line}")
            .map_err(|e| AppError::export(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write a summary to a JSON file.
pub fn write_summary_json(path: &Path, summary: &Summary) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::export(format!("Failed to create export JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::export(format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

fn fmt_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

/// Quote a label when it would break the CSV shape.
fn csv_cell(label: &str) -> String {
    if label.contains(',') || label.contains('"') || label.contains('\n') {
        format!("\"{}\"", label.replace('"', "\"\""))
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ReportKind, SummaryRow};

    fn tmp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("sales-pulse-{}-{name}", std::process::id()))
    }

    #[test]
    fn csv_export_uses_report_columns_and_keeps_order() {
        let summary = Summary::with_rows(
            ReportKind::YearlyGrowth,
            vec![
                SummaryRow::new("2021", 200.0),
                SummaryRow::new("2022", 250.0).with_derived(25.0),
            ],
        );
        let path = tmp_path("growth.csv");
        write_summary_csv(&path, &summary).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "year,total_sales,growth_pct");
        assert_eq!(lines[1], "2021,200.000000,");
        assert_eq!(lines[2], "2022,250.000000,25.000000");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn csv_export_includes_rank_when_present() {
        let summary = Summary::with_rows(
            ReportKind::StoreRankingByState,
            vec![SummaryRow::new("44", 9000.0).with_rank(1)],
        );
        let path = tmp_path("ranking.csv");
        write_summary_csv(&path, &summary).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("rank,store_nbr,total_sales\n"));
        assert!(text.contains("1,44,9000.000000"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn labels_with_commas_are_quoted() {
        assert_eq!(csv_cell("Quito, DM"), "\"Quito, DM\"");
        assert_eq!(csv_cell("Quito"), "Quito");
    }

    #[test]
    fn json_export_round_trips_structurally() {
        let summary = Summary::with_rows(
            ReportKind::TopProducts,
            vec![SummaryRow::new("GROCERY I", 12.5)],
        );
        let path = tmp_path("top.json");
        write_summary_json(&path, &summary).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["report"], "top_products");
        assert_eq!(parsed["rows"][0]["label"], "GROCERY I");
        assert_eq!(parsed["rows"][0]["value"], 12.5);

        std::fs::remove_file(&path).unwrap();
    }
}
