//! Data acquisition.
//!
//! The aggregation core never touches files or sockets; it consumes raw
//! in-memory tables produced by a [`SourceProvider`]. Two providers ship:
//!
//! - [`LocalFiles`]: an explicit file list or a directory of CSV parts
//! - [`RemoteDownload`]: CSV parts fetched over HTTP from a base URL
//!
//! Both parse bytes into [`RawTable`]s with the same CSV reader settings, so
//! the normalizer sees identical input regardless of where bytes came from.

use std::io::Read;

use crate::error::AppError;

pub mod local;
pub mod remote;

pub use local::LocalFiles;
pub use remote::RemoteDownload;

/// One raw tabular source, prior to normalization.
///
/// Headers and cells are kept as strings; typing happens in the normalizer
/// so that per-row failures can be reported against the source they came
/// from.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Source label (file name or URL) used in row-level error reports.
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Records the CSV reader itself could not parse: (1-based line, reason).
    pub bad_records: Vec<(usize, String)>,
}

/// Supplies raw tabular sources to the pipeline.
///
/// A provider must surface a clear failure when no sources are available;
/// it never returns an empty set silently.
pub trait SourceProvider {
    /// Human-readable description of where the data comes from.
    fn describe(&self) -> String;

    /// Fetch and parse all raw sources.
    fn fetch(&self) -> Result<Vec<RawTable>, AppError>;
}

/// Parse CSV bytes into a [`RawTable`].
///
/// Matches the reader settings used across the pipeline: flexible record
/// lengths and whitespace trimming, so ragged exports and padded cells do not
/// fail the whole source. Individual malformed records are recorded, not
/// fatal.
pub fn read_csv_table(name: &str, input: impl Read) -> Result<RawTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::source(format!("Failed to read CSV headers from '{name}': {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    let mut bad_records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header row, and lines are 1-based.
        let line = idx + 2;
        match result {
            Ok(record) => rows.push(record.iter().map(str::to_string).collect()),
            Err(e) => bad_records.push((line, format!("CSV parse error: {e}"))),
        }
    }

    Ok(RawTable {
        name: name.to_string(),
        headers,
        rows,
        bad_records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_headers_and_rows() {
        let csv = "date,store_nbr,sales\n2023-01-01,1,10.5\n2023-01-02,2,20.0\n";
        let table = read_csv_table("part.csv", csv.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["date", "store_nbr", "sales"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["2023-01-02", "2", "20.0"]);
        assert!(table.bad_records.is_empty());
    }

    #[test]
    fn trims_cell_whitespace() {
        let csv = "date , sales\n 2023-01-01 ,  5.0 \n";
        let table = read_csv_table("part.csv", csv.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["date", "sales"]);
        assert_eq!(table.rows[0], vec!["2023-01-01", "5.0"]);
    }

    #[test]
    fn ragged_rows_survive_flexible_mode() {
        let csv = "a,b,c\n1,2,3\n4,5\n";
        let table = read_csv_table("part.csv", csv.as_bytes()).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["4", "5"]);
    }
}
