//! Field values and schema-bound records.

use duckdb::types::{ToSql, ToSqlOutput, ValueRef};

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Real(f64),
}

impl Value {
    /// Empty source fields are missing values, not empty strings.
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            Self::Null
        } else {
            Self::Text(raw.to_string())
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Owned(duckdb::types::Value::Null),
            Self::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Self::Integer(i) => ToSqlOutput::Owned(duckdb::types::Value::BigInt(*i)),
            Self::Real(f) => ToSqlOutput::Owned(duckdb::types::Value::Double(*f)),
        })
    }
}

/// One row of an extract, values in schema column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Apply `f` to the value at `index`, if present.
    pub fn update(&mut self, index: usize, f: impl FnOnce(Value) -> Value) {
        if let Some(slot) = self.values.get_mut(index) {
            let taken = std::mem::replace(slot, Value::Null);
            *slot = f(taken);
        }
    }

    /// Apply `f` to every value.
    pub fn map_values(self, f: impl FnMut(Value) -> Value) -> Self {
        Self {
            values: self.values.into_iter().map(f).collect(),
        }
    }
}
