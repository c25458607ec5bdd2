//! bdpm-core - Shared infrastructure for the BDPM ingestion tools
//!
//! Logging and progress reporting used by both the ingestion library
//! and the command-line front end.

pub mod logging;
pub mod progress;

// Re-exports for convenience
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, fmt_num};
