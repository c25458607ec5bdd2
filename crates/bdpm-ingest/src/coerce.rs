//! Locale-aware numeric coercion for the presentations extract.
//!
//! Extraction is deliberately permissive: the registry fields carry
//! currency suffixes, percent signs and stray spacing. Anything that does
//! not yield a number becomes null.

use std::sync::LazyLock;

use regex::Regex;

use crate::record::{Record, Value};
use crate::schema::{ColumnType, TableSpec};

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").unwrap());

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// Parse a decimal-comma price: `"12,34 EUR"` -> `12.34`.
pub fn coerce_price(raw: &str) -> Option<f64> {
    // Comma must go first, the pattern only knows the dot
    let dotted = raw.replace(',', ".");
    DECIMAL.find(&dotted)?.as_str().parse().ok()
}

/// Parse a reimbursement rate from its first digit run: `"65%"` -> `65`.
pub fn coerce_reimbursement(raw: &str) -> Option<i64> {
    DIGITS.find(raw)?.as_str().parse().ok()
}

fn price_value(value: Value) -> Value {
    match value.as_text().and_then(coerce_price) {
        Some(price) => Value::Real(price),
        None => Value::Null,
    }
}

fn rate_value(value: Value) -> Value {
    match value.as_text().and_then(coerce_reimbursement) {
        Some(rate) => Value::Integer(rate),
        None => Value::Null,
    }
}

/// Coerce the numeric columns of a record according to its table.
///
/// Text columns are left alone; for tables without numeric columns this
/// returns the record unchanged.
pub fn coerce_record(spec: &TableSpec, mut record: Record) -> Record {
    for (i, column) in spec.columns.iter().enumerate() {
        match column.kind {
            ColumnType::Text => {}
            ColumnType::Price => record.update(i, price_value),
            ColumnType::Rate => record.update(i, rate_value),
        }
    }
    record
}
