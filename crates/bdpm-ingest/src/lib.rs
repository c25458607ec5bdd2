//! bdpm-ingest: BDPM drug-registry ingestion pipeline
//!
//! Reads the five tab-delimited, latin-1 registry extracts, normalizes
//! every text field (accents stripped, trimmed, upper-cased), reparses the
//! decimal-comma price and percentage reimbursement fields of the
//! presentations, and rebuilds a DuckDB store from scratch with one table
//! per extract plus lookup indexes.
//!
//! # Example
//!
//! ```ignore
//! use bdpm_ingest::{IngestConfig, run};
//!
//! let config = IngestConfig {
//!     data_dir: "files".into(),
//!     ..Default::default()
//! };
//! let summary = run(&config, &bdpm_core::ProgressContext::new())?;
//! for table in &summary.tables {
//!     println!("{}: {} rows", table.table, table.rows());
//! }
//! ```

pub mod coerce;
pub mod config;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod reader;
pub mod record;
pub mod schema;
mod sql;

// Re-exports
pub use coerce::{coerce_price, coerce_record, coerce_reimbursement};
pub use config::IngestConfig;
pub use error::IngestError;
pub use loader::load_table;
pub use normalize::{normalize, normalize_record, normalize_value};
pub use pipeline::{
    IndexFailure, Pipeline, PipelineState, PipelineSummary, TableOutcome, TableReport,
    index_names, run, table_rows,
};
pub use reader::{DEFAULT_ENCODING, ExtractReader, ReadStats, resolve_encoding};
pub use record::{Record, Value};
pub use schema::{EXTRACTS, INDEXES, IndexSpec, TableSpec};
