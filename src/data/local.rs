//! Local file-set provider.
//!
//! Mirrors how the hosted variants shipped their data: a `data/` directory
//! holding the dataset split into CSV parts. The part set is either given
//! explicitly or discovered by scanning the directory; discovered parts are
//! taken in sorted name order so the union order of the canonical table is
//! deterministic run to run.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::data::{RawTable, SourceProvider, read_csv_table};
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct LocalFiles {
    paths: Vec<PathBuf>,
}

impl LocalFiles {
    /// Use an explicit file list, in the order given.
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Discover `*.csv` parts in `dir`, sorted by file name.
    pub fn discover(dir: &Path) -> Result<Self, AppError> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            AppError::source(format!("Failed to read data directory '{}': {e}", dir.display()))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                AppError::source(format!("Failed to list data directory '{}': {e}", dir.display()))
            })?;
            let path = entry.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if is_csv && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl SourceProvider for LocalFiles {
    fn describe(&self) -> String {
        let names: Vec<String> = self
            .paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        format!("local files [{}]", names.join(", "))
    }

    fn fetch(&self) -> Result<Vec<RawTable>, AppError> {
        if self.paths.is_empty() {
            return Err(AppError::source(
                "No CSV sources found. Pass --file or point --data-dir at a directory of CSV parts.",
            ));
        }

        let mut tables = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            let file = File::open(path).map_err(|e| {
                AppError::source(format!("Failed to open CSV '{}': {e}", path.display()))
            })?;
            tables.push(read_csv_table(&path.display().to_string(), file)?);
        }
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn missing_directory_is_a_source_error() {
        let err = LocalFiles::discover(Path::new("/nonexistent/sales-data")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Source);
    }

    #[test]
    fn empty_file_set_is_a_source_error() {
        let provider = LocalFiles::new(Vec::new());
        let err = provider.fetch().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Source);
    }

    #[test]
    fn discover_sorts_and_keeps_only_csv() {
        let dir = std::env::temp_dir().join(format!("sales-pulse-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("parte_2.csv"), "a\n1\n").unwrap();
        std::fs::write(dir.join("parte_1.csv"), "a\n1\n").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignore me").unwrap();

        let provider = LocalFiles::discover(&dir).unwrap();
        let names: Vec<_> = provider
            .paths()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["parte_1.csv", "parte_2.csv"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
