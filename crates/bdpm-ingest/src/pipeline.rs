//! Pipeline orchestration: fresh store, five table loads, indexes, close.
//!
//! States run `Initializing -> LoadingTable(1..=5) -> Indexing -> Closed`.
//! A missing extract skips its table; a failed index is logged and
//! counted. Only store (and mid-file read) failures end the run early.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use bdpm_core::{ProgressContext, fmt_num};
use duckdb::{Connection, params};
use encoding_rs::Encoding;

use crate::coerce::coerce_record;
use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::loader::load_table;
use crate::normalize::normalize_record;
use crate::reader::{ExtractReader, ReadStats, resolve_encoding};
use crate::schema::{EXTRACTS, INDEXES, TableSpec};
use crate::sql;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Initializing,
    /// 1-based position in the extract list.
    LoadingTable(usize),
    Indexing,
    Closed,
}

/// What happened to one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
    Loaded { rows: usize, stats: ReadStats },
    Skipped { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: &'static str,
    pub outcome: TableOutcome,
}

impl TableReport {
    /// Rows loaded, zero when skipped.
    pub fn rows(&self) -> usize {
        match self.outcome {
            TableOutcome::Loaded { rows, .. } => rows,
            TableOutcome::Skipped { .. } => 0,
        }
    }
}

/// An index statement that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFailure {
    pub index: &'static str,
    pub message: String,
}

/// Pipeline execution summary
#[derive(Debug)]
pub struct PipelineSummary {
    pub db_path: PathBuf,
    pub tables: Vec<TableReport>,
    pub indexes_created: usize,
    pub index_failures: Vec<IndexFailure>,
    pub final_state: PipelineState,
    pub elapsed: Duration,
}

impl PipelineSummary {
    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.table == name)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &TableReport> {
        self.tables
            .iter()
            .filter(|t| matches!(t.outcome, TableOutcome::Skipped { .. }))
    }
}

/// Delete the database file and its write-ahead log.
fn remove_store(path: &Path) -> anyhow::Result<()> {
    let mut wal = path.as_os_str().to_owned();
    wal.push(".wal");
    for file in [path.to_path_buf(), PathBuf::from(wal)] {
        match std::fs::remove_file(&file) {
            Ok(()) => log::debug!("Removed previous store file {}", file.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to remove {}", file.display()));
            }
        }
    }
    Ok(())
}

/// One ingestion run holding the store connection.
pub struct Pipeline {
    config: IngestConfig,
    encoding: &'static Encoding,
    conn: Connection,
    state: PipelineState,
}

impl Pipeline {
    /// Discard any existing store at `config.db_path` and open an empty one.
    pub fn open(config: &IngestConfig) -> Result<Self, IngestError> {
        let encoding = resolve_encoding(&config.encoding)?;

        let open = || -> anyhow::Result<Connection> {
            if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            remove_store(&config.db_path)?;
            Connection::open(&config.db_path)
                .with_context(|| format!("Failed to open store {}", config.db_path.display()))
        };
        let conn = open().map_err(IngestError::Store)?;

        log::info!(
            "Fresh store at {} (source {}, {})",
            config.db_path.display(),
            config.data_dir.display(),
            encoding.name()
        );
        Ok(Self {
            config: config.clone(),
            encoding,
            conn,
            state: PipelineState::Initializing,
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Read, normalize, coerce and load one extract.
    pub fn process_table(
        &mut self,
        spec: &TableSpec,
        progress: &ProgressContext,
    ) -> Result<TableReport, IngestError> {
        let path = self.config.data_dir.join(spec.file);
        let mut reader = match ExtractReader::open(&path, *spec, self.encoding) {
            Ok(reader) => reader,
            Err(e) if e.is_recoverable() => {
                log::warn!("{e}");
                return Ok(TableReport {
                    table: spec.table,
                    outcome: TableOutcome::Skipped { path },
                });
            }
            Err(e) => return Err(e),
        };

        log::info!("Processing {}...", spec.table);
        let pb = progress.table_line(spec.table);
        let coerce = spec.has_coerced_columns();
        let records = reader.by_ref().map(|record| {
            record.map(|r| {
                let r = normalize_record(r);
                if coerce { coerce_record(spec, r) } else { r }
            })
        });

        let rows = match load_table(&mut self.conn, spec, records, &pb) {
            Ok(rows) => rows,
            Err(e) => {
                pb.abandon_with_message("failed");
                return Err(e);
            }
        };
        let stats = reader.stats();
        pb.finish_with_message("done");

        if stats.dropped() > 0 {
            log::warn!(
                "{}: skipped {} malformed line(s) out of {} ({} undecodable)",
                spec.table,
                fmt_num(stats.dropped()),
                fmt_num(stats.lines),
                stats.undecodable
            );
        }
        log::info!("{}: {} rows inserted", spec.table, fmt_num(rows));

        Ok(TableReport {
            table: spec.table,
            outcome: TableOutcome::Loaded { rows, stats },
        })
    }

    /// Create the secondary indexes. Failures are logged, never fatal.
    pub fn create_indexes(&mut self) -> (usize, Vec<IndexFailure>) {
        self.state = PipelineState::Indexing;
        log::info!("Creating indexes...");
        let mut created = 0;
        let mut failures = Vec::new();
        for index in &INDEXES {
            match self.conn.execute_batch(&sql::create_index(index)) {
                Ok(()) => {
                    created += 1;
                    log::debug!("Index {} on {}({})", index.name, index.table, index.column);
                }
                Err(e) => {
                    log::warn!("Index {} failed: {e}", index.name);
                    failures.push(IndexFailure {
                        index: index.name,
                        message: e.to_string(),
                    });
                }
            }
        }
        (created, failures)
    }

    /// Release the store connection.
    pub fn close(mut self) -> Result<PipelineState, IngestError> {
        self.state = PipelineState::Closed;
        self.conn.close().map_err(|(_, e)| {
            IngestError::Store(anyhow::Error::new(e).context("Failed to close store"))
        })?;
        Ok(self.state)
    }
}

/// Run the full rebuild.
pub fn run(
    config: &IngestConfig,
    progress: &ProgressContext,
) -> Result<PipelineSummary, IngestError> {
    let start = Instant::now();
    let mut pipeline = Pipeline::open(config)?;

    let mut tables = Vec::with_capacity(EXTRACTS.len());
    for (i, spec) in EXTRACTS.iter().enumerate() {
        pipeline.state = PipelineState::LoadingTable(i + 1);
        tables.push(pipeline.process_table(spec, progress)?);
    }

    let (indexes_created, index_failures) = pipeline.create_indexes();
    let final_state = pipeline.close()?;

    let summary = PipelineSummary {
        db_path: config.db_path.clone(),
        tables,
        indexes_created,
        index_failures,
        final_state,
        elapsed: start.elapsed(),
    };

    let skipped = summary.skipped().count();
    if skipped > 0 {
        log::warn!("{skipped} table(s) skipped for missing source files");
    }
    log::info!(
        "Pipeline complete in {:.1}s: {}",
        summary.elapsed.as_secs_f64(),
        summary.db_path.display()
    );
    Ok(summary)
}

/// Row count of a table, `None` when the table does not exist.
pub fn table_rows(conn: &Connection, table: &str) -> anyhow::Result<Option<usize>> {
    let exists: i64 = conn
        .query_row(sql::table_exists(), params![table], |r| r.get(0))
        .context("Failed to query table catalog")?;
    if exists == 0 {
        return Ok(None);
    }
    let rows: i64 = conn
        .query_row(&sql::count_rows(table), [], |r| r.get(0))
        .with_context(|| format!("Failed to count rows in {table}"))?;
    Ok(Some(rows as usize))
}

/// Names of the indexes defined on a table.
pub fn index_names(conn: &Connection, table: &str) -> anyhow::Result<Vec<String>> {
    let mut stmt = conn
        .prepare(sql::indexes_on())
        .context("Failed to query index catalog")?;
    let names = stmt
        .query_map(params![table], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}
