//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the canonical table row (`SalesRecord`) and its derived calendar fields
//! - the closed report-kind enum and its strategy metadata (`ReportKind`)
//! - report results (`Summary`, `SummaryRow`)
//! - caller-supplied drill-down predicates (`RowFilter`)

pub mod types;

pub use types::*;
