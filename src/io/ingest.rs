//! Normalization: raw tables in, canonical sales table out.
//!
//! This module turns heterogeneous CSV part files into one clean, date-sorted
//! table that every report computation reads.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear per-source errors)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic output** (stable date sort; ties keep source order)
//! - **Separation of concerns**: no aggregation logic here

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::data::RawTable;
use crate::domain::{DatasetStats, SalesRecord};
use crate::error::AppError;

/// Columns every source must carry. `transactions` is optional.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "date",
    "store_nbr",
    "family",
    "sales",
    "onpromotion",
    "state",
    "city",
];

/// A row-level error encountered during normalization.
#[derive(Debug, Clone)]
pub struct RowError {
    /// Label of the source the row came from.
    pub source: String,
    /// 1-based line number within that source.
    pub line: usize,
    pub message: String,
}

/// The canonical table plus ingest diagnostics.
///
/// Built once per session and held read-only; every report computation is a
/// pure read over [`Dataset::records`]. Reloading means building a fresh
/// `Dataset`, never mutating this one.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<SalesRecord>,
    pub stats: DatasetStats,
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
    /// Labels of the sources that were unioned, in union order.
    pub sources: Vec<String>,
}

impl Dataset {
    /// The canonical table, sorted by date ascending.
    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Distinct store numbers, ascending.
    pub fn stores(&self) -> Vec<u32> {
        let set: BTreeSet<u32> = self.records.iter().map(|r| r.store_nbr).collect();
        set.into_iter().collect()
    }

    /// Distinct state names, ascending.
    pub fn states(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.records.iter().map(|r| r.state.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }
}

/// Union raw sources into the canonical table.
///
/// Column names are trimmed, lower-cased, and BOM-stripped before lookup, so
/// sources may vary in casing; stray columns (for example a leftover pandas
/// index exported as `Unnamed: 0`) are ignored. Rows with unparseable dates
/// or invalid required fields are dropped and recorded, never zeroed. Fails
/// only when a source is missing a required column or when zero usable rows
/// remain.
pub fn normalize(sources: &[RawTable]) -> Result<Dataset, AppError> {
    if sources.is_empty() {
        return Err(AppError::load("No data sources to normalize."));
    }

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut source_labels = Vec::with_capacity(sources.len());

    for table in sources {
        source_labels.push(table.name.clone());
        let header_map = build_header_map(&table.headers);
        ensure_required_columns(&table.name, &header_map)?;

        for (line, message) in &table.bad_records {
            row_errors.push(RowError {
                source: table.name.clone(),
                line: *line,
                message: message.clone(),
            });
        }

        for (idx, row) in table.rows.iter().enumerate() {
            // +2: rows start after the header line, and lines are 1-based.
            let line = idx + 2;
            rows_read += 1;

            match parse_row(row, &header_map) {
                Ok(record) => records.push(record),
                Err(message) => row_errors.push(RowError {
                    source: table.name.clone(),
                    line,
                    message,
                }),
            }
        }
    }

    if records.is_empty() {
        return Err(AppError::load(
            "No usable rows remain after normalization; check the source files.",
        ));
    }

    // Stable: rows sharing a date keep their source (union) order.
    records.sort_by_key(|r| r.date);

    let stats = compute_stats(&records);

    Ok(Dataset {
        records,
        stats,
        rows_read,
        row_errors,
        sources: source_labels,
    })
}

fn build_header_map(headers: &[String]) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header. If we don't strip it, schema validation will
    // incorrectly report the column as missing.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns(
    source: &str,
    header_map: &HashMap<String, usize>,
) -> Result<(), AppError> {
    for column in REQUIRED_COLUMNS {
        if !header_map.contains_key(column) {
            return Err(AppError::load(format!(
                "Source '{source}' is missing required column `{column}`."
            )));
        }
    }
    Ok(())
}

fn parse_row(row: &[String], header_map: &HashMap<String, usize>) -> Result<SalesRecord, String> {
    let date = parse_date(get_required(row, header_map, "date")?)?;

    let store_nbr = parse_count(get_required(row, header_map, "store_nbr")?)
        .map_err(|e| format!("Invalid `store_nbr`: {e}"))?;
    let store_nbr =
        u32::try_from(store_nbr).map_err(|_| "Invalid `store_nbr`: out of range.".to_string())?;

    let family = get_required(row, header_map, "family")?.to_string();

    let sales = parse_sales(get_required(row, header_map, "sales")?)?;

    // Absent promotion counts coerce to 0 rather than dropping the row.
    let onpromotion = match get_optional(row, header_map, "onpromotion") {
        Some(raw) => {
            let v = parse_count(raw).map_err(|e| format!("Invalid `onpromotion`: {e}"))?;
            u32::try_from(v).map_err(|_| "Invalid `onpromotion`: out of range.".to_string())?
        }
        None => 0,
    };

    let state = get_required(row, header_map, "state")?.to_string();
    let city = get_required(row, header_map, "city")?.to_string();

    let transactions = match get_optional(row, header_map, "transactions") {
        Some(raw) => {
            Some(parse_count(raw).map_err(|e| format!("Invalid `transactions`: {e}"))?)
        }
        None => None,
    };

    Ok(SalesRecord::new(
        date,
        store_nbr,
        family,
        sales,
        onpromotion,
        state,
        city,
        transactions,
    ))
}

fn get_required<'a>(
    row: &'a [String],
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    row.get(*idx)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(
    row: &'a [String],
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    row.get(*idx).map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // ISO dates are the norm, but spreadsheet round-trips produce a handful
    // of other shapes. Parsing stays deterministic: first matching format
    // wins, anything else drops the row.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    // Datetime exports ("2023-01-01 00:00:00") carry a date up front.
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    Err(format!("Invalid date '{s}'."))
}

fn parse_sales(s: &str) -> Result<f64, String> {
    let v: f64 = s
        .parse()
        .map_err(|_| format!("Invalid `sales` value '{s}'."))?;
    if !v.is_finite() || v < 0.0 {
        return Err(format!("Invalid `sales` value '{s}' (must be finite and >= 0)."));
    }
    Ok(v)
}

/// Parse a non-negative integer count, accepting float-formatted integers
/// ("3.0") by truncating toward zero.
fn parse_count(s: &str) -> Result<u64, String> {
    if let Ok(v) = s.parse::<u64>() {
        return Ok(v);
    }
    let v: f64 = s.parse().map_err(|_| format!("'{s}' is not a number."))?;
    if !v.is_finite() || v < 0.0 {
        return Err(format!("'{s}' must be finite and >= 0."));
    }
    Ok(v.trunc() as u64)
}

fn compute_stats(records: &[SalesRecord]) -> DatasetStats {
    let stores: BTreeSet<u32> = records.iter().map(|r| r.store_nbr).collect();
    let families: BTreeSet<&str> = records.iter().map(|r| r.family.as_str()).collect();
    let states: BTreeSet<&str> = records.iter().map(|r| r.state.as_str()).collect();
    let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();

    // Records are date-sorted, so the month range is first/last.
    let first = records.first().map(|r| r.date);
    let last = records.last().map(|r| r.date);

    DatasetStats {
        rows: records.len(),
        stores: stores.len(),
        families: families.len(),
        states: states.len(),
        years: years.len(),
        first_month: first.map(fmt_month).unwrap_or_default(),
        last_month: last.map(fmt_month).unwrap_or_default(),
    }
}

fn fmt_month(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}
