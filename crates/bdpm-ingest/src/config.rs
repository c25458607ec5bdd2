use std::path::PathBuf;

use crate::reader::DEFAULT_ENCODING;

/// Configuration for one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Directory holding the five extract files
    pub data_dir: PathBuf,
    /// DuckDB database file, deleted and recreated on every run
    pub db_path: PathBuf,
    /// Encoding label of the extracts (e.g. "latin1")
    pub encoding: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("files"),
            db_path: PathBuf::from("bdpm.duckdb"),
            encoding: DEFAULT_ENCODING.to_string(),
        }
    }
}
