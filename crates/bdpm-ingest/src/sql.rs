//! SQL generation for table (re)creation, indexing and inspection.

use crate::schema::{IndexSpec, TableSpec};

/// Quote an identifier for DuckDB.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Drop the table if present.
pub fn drop_table(spec: &TableSpec) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(spec.table))
}

/// Create the table with one column per schema column.
pub fn create_table(spec: &TableSpec) -> String {
    let columns = spec
        .columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(c.name), c.kind.sql_type()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({columns})", quote_ident(spec.table))
}

pub fn create_index(index: &IndexSpec) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {} ON {}({})",
        quote_ident(index.name),
        quote_ident(index.table),
        quote_ident(index.column)
    )
}

pub fn count_rows(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", quote_ident(table))
}

/// Whether a table exists in the main schema. Takes the table name as `?`.
pub fn table_exists() -> &'static str {
    "SELECT COUNT(*) FROM duckdb_tables() WHERE table_name = ?"
}

/// Index names defined on a table. Takes the table name as `?`.
pub fn indexes_on() -> &'static str {
    "SELECT index_name FROM duckdb_indexes() WHERE table_name = ? ORDER BY index_name"
}
