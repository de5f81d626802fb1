//! Remote download provider.
//!
//! Fetches the CSV parts over HTTP from a base URL, the way the cloud-hosted
//! variants pulled their dataset from the repository instead of bundling it.
//! The base URL comes from `--base-url` or the `SALES_DATA_BASE_URL`
//! environment variable (a `.env` file is honored).

use reqwest::blocking::Client;

use crate::data::{RawTable, SourceProvider, read_csv_table};
use crate::error::AppError;

/// Environment variable naming the download base URL.
pub const BASE_URL_ENV: &str = "SALES_DATA_BASE_URL";

/// Part file names used when none are given, matching the split the
/// original dataset ships with.
pub const DEFAULT_PARTS: [&str; 2] = ["parte_1.csv", "parte_2.csv"];

pub struct RemoteDownload {
    client: Client,
    base_url: String,
    parts: Vec<String>,
}

impl RemoteDownload {
    pub fn new(base_url: impl Into<String>, parts: Vec<String>) -> Self {
        let parts = if parts.is_empty() {
            DEFAULT_PARTS.iter().map(|s| s.to_string()).collect()
        } else {
            parts
        };
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            parts,
        }
    }

    /// Build a provider from the environment (`.env` honored).
    pub fn from_env(parts: Vec<String>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var(BASE_URL_ENV).map_err(|_| {
            AppError::source(format!(
                "Missing {BASE_URL_ENV} in environment (.env); pass --base-url instead."
            ))
        })?;
        Ok(Self::new(base_url, parts))
    }

    fn part_url(&self, part: &str) -> String {
        format!("{}/{}", self.base_url, part.trim_start_matches('/'))
    }
}

impl SourceProvider for RemoteDownload {
    fn describe(&self) -> String {
        format!("remote download [{}] from {}", self.parts.join(", "), self.base_url)
    }

    fn fetch(&self) -> Result<Vec<RawTable>, AppError> {
        if self.parts.is_empty() {
            return Err(AppError::source("No remote parts configured."));
        }

        let mut tables = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            let url = self.part_url(part);

            let resp = self
                .client
                .get(&url)
                .send()
                .map_err(|e| AppError::source(format!("Download of '{url}' failed: {e}")))?;

            if !resp.status().is_success() {
                return Err(AppError::source(format!(
                    "Download of '{url}' failed with status {}.",
                    resp.status()
                )));
            }

            let body = resp
                .text()
                .map_err(|e| AppError::source(format!("Failed to read body of '{url}': {e}")))?;

            tables.push(read_csv_table(&url, body.as_bytes())?);
        }
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_urls_join_cleanly() {
        let provider = RemoteDownload::new("https://example.com/data/", Vec::new());
        assert_eq!(
            provider.part_url("parte_1.csv"),
            "https://example.com/data/parte_1.csv"
        );
        assert_eq!(
            provider.part_url("/parte_2.csv"),
            "https://example.com/data/parte_2.csv"
        );
    }

    #[test]
    fn empty_part_list_falls_back_to_default_split() {
        let provider = RemoteDownload::new("https://example.com", Vec::new());
        assert_eq!(provider.parts, DEFAULT_PARTS);
    }
}
