//! Table loader: drop, recreate and bulk-fill one table per transaction.

use duckdb::{Connection, appender_params_from_iter};
use indicatif::ProgressBar;

use crate::error::IngestError;
use crate::record::Record;
use crate::schema::TableSpec;
use crate::sql;

/// Replace `spec.table` with `records`, returning the row count.
///
/// Drop, create and every insert share one transaction: on any error the
/// transaction is rolled back and the previous state of the table (if
/// any) is kept. A read error from `records` aborts the load the same way.
pub fn load_table<I>(
    conn: &mut Connection,
    spec: &TableSpec,
    records: I,
    pb: &ProgressBar,
) -> Result<usize, IngestError>
where
    I: IntoIterator<Item = std::io::Result<Record>>,
{
    let table = spec.table;
    let store_err = |source: duckdb::Error| IngestError::StoreWrite { table, source };

    let tx = conn.transaction().map_err(store_err)?;
    tx.execute_batch(&format!(
        "{};\n{};",
        sql::drop_table(spec),
        sql::create_table(spec)
    ))
    .map_err(store_err)?;

    let rows = {
        let mut appender = tx.appender(table).map_err(store_err)?;
        let mut rows = 0usize;
        for record in records {
            let record = record.map_err(|source| IngestError::Read { table, source })?;
            appender
                .append_row(appender_params_from_iter(record.values()))
                .map_err(store_err)?;
            rows += 1;
            pb.inc(1);
        }
        appender.flush().map_err(store_err)?;
        rows
    };

    tx.commit().map_err(store_err)?;
    log::debug!("{table}: committed {rows} rows");
    Ok(rows)
}
