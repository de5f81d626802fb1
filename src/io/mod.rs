//! Input/output helpers.
//!
//! - normalization of raw tables into the canonical dataset (`ingest`)
//! - summary exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
