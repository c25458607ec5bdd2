//! Streaming reader for the tab-delimited, header-less BDPM extracts.
//!
//! Lines are split on raw bytes and decoded one at a time with the
//! declared single-byte encoding. A line that does not decode or does not
//! have exactly one field per schema column is dropped and counted; the
//! reader always moves on to the next line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use encoding_rs::Encoding;

use crate::error::IngestError;
use crate::record::{Record, Value};
use crate::schema::TableSpec;

/// Default label for the registry files.
pub const DEFAULT_ENCODING: &str = "latin1";

/// Resolve an encoding label (`latin1`, `windows-1252`, `utf-8`, ...).
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, IngestError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| IngestError::UnknownEncoding(label.to_string()))
}

/// Line counters for one extract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Physical lines consumed.
    pub lines: usize,
    /// Lines with the wrong number of fields.
    pub malformed: usize,
    /// Lines rejected by the decoder.
    pub undecodable: usize,
    /// Empty lines.
    pub blank: usize,
}

impl ReadStats {
    /// Non-blank lines that were dropped.
    pub fn dropped(&self) -> usize {
        self.malformed + self.undecodable
    }
}

/// Lazy, schema-bound record stream over one extract.
pub struct ExtractReader<R = BufReader<File>> {
    inner: R,
    spec: TableSpec,
    encoding: &'static Encoding,
    buf: Vec<u8>,
    stats: ReadStats,
    done: bool,
}

impl ExtractReader {
    /// Open an extract file.
    ///
    /// Returns [`IngestError::MissingSourceFile`] when the path does not
    /// exist; any other open failure is a read error.
    pub fn open(
        path: &Path,
        spec: TableSpec,
        encoding: &'static Encoding,
    ) -> Result<Self, IngestError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => IngestError::MissingSourceFile {
                table: spec.table,
                path: path.to_path_buf(),
            },
            _ => IngestError::Read {
                table: spec.table,
                source: e,
            },
        })?;
        Ok(Self::from_reader(BufReader::new(file), spec, encoding))
    }
}

impl<R: BufRead> ExtractReader<R> {
    pub fn from_reader(inner: R, spec: TableSpec, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            spec,
            encoding,
            buf: Vec::with_capacity(512),
            stats: ReadStats::default(),
            done: false,
        }
    }

    /// Counters so far; final once the iterator is exhausted.
    pub fn stats(&self) -> ReadStats {
        self.stats
    }
}

/// Drop the line terminator (LF or CRLF).
fn trim_eol(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

impl<R: BufRead> Iterator for ExtractReader<R> {
    type Item = std::io::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.buf.clear();
            match self.inner.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
            self.stats.lines += 1;
            let line_no = self.stats.lines;

            let line = trim_eol(&self.buf);
            if line.is_empty() {
                self.stats.blank += 1;
                continue;
            }

            let Some(text) = self
                .encoding
                .decode_without_bom_handling_and_without_replacement(line)
            else {
                self.stats.undecodable += 1;
                log::debug!("{}: line {line_no}: undecodable, skipped", self.spec.table);
                continue;
            };

            let fields: Vec<&str> = text.split('\t').collect();
            if fields.len() != self.spec.column_count() {
                self.stats.malformed += 1;
                log::debug!(
                    "{}: line {line_no}: expected {} fields, got {}, skipped",
                    self.spec.table,
                    self.spec.column_count(),
                    fields.len()
                );
                continue;
            }

            let values = fields.into_iter().map(Value::from_raw).collect();
            return Some(Ok(Record::new(values)));
        }
    }
}
