//! Errors surfaced by the ingestion pipeline.
//!
//! Per-row and per-field problems never reach this type: malformed lines
//! are dropped by the reader and uncoercible numbers become null.

use std::path::PathBuf;

#[derive(Debug)]
pub enum IngestError {
    /// The extract file for a table is absent. Recovered by skipping it.
    MissingSourceFile { table: &'static str, path: PathBuf },
    /// The configured encoding label is not known to `encoding_rs`.
    UnknownEncoding(String),
    /// Reading the extract failed mid-file.
    Read {
        table: &'static str,
        source: std::io::Error,
    },
    /// Writing a table to the store failed. Fatal for the run.
    StoreWrite {
        table: &'static str,
        source: duckdb::Error,
    },
    /// Opening or resetting the store failed.
    Store(anyhow::Error),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSourceFile { table, path } => {
                write!(f, "{table}: source file not found: {}", path.display())
            }
            Self::UnknownEncoding(label) => write!(f, "unknown source encoding: {label}"),
            Self::Read { table, source } => write!(f, "{table}: read failed: {source}"),
            Self::StoreWrite { table, source } => {
                write!(f, "{table}: store write failed: {source}")
            }
            Self::Store(e) => write!(f, "store: {e:#}"),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::StoreWrite { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl IngestError {
    /// Whether the pipeline carries on after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MissingSourceFile { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_recoverable() {
        let err = IngestError::MissingSourceFile {
            table: "compositions",
            path: PathBuf::from("files/CIS_COMPO_bdpm.txt"),
        };
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "compositions: source file not found: files/CIS_COMPO_bdpm.txt"
        );
    }

    #[test]
    fn read_failure_names_table() {
        let err = IngestError::Read {
            table: "presentations",
            source: std::io::Error::other("disk gone"),
        };
        assert!(!err.is_recoverable());
        assert!(err.to_string().starts_with("presentations:"));
    }

    #[test]
    fn unknown_encoding_is_fatal() {
        let err = IngestError::UnknownEncoding("klingon".into());
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("klingon"));
    }
}
