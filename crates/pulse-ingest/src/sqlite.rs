// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use pulse_model::{FlatRecord, MetricValue, TableSchema};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use crate::{IngestError, IngestErrorCode, LoadMode};

pub const SQLITE_SCHEMA_VERSION: i64 = 1;

/// Audit row written in the same transaction as the family's data.
#[derive(Debug, Clone)]
pub struct RunAudit<'a> {
    pub family: &'a str,
    pub files_loaded: u64,
    pub files_skipped: u64,
    pub mode: LoadMode,
}

pub fn open_store(path: &Path) -> Result<Connection, IngestError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch(
        "
        PRAGMA synchronous=NORMAL;
        PRAGMA temp_store=MEMORY;
        CREATE TABLE IF NOT EXISTS pulse_meta (
          k TEXT PRIMARY KEY,
          v TEXT NOT NULL
        ) WITHOUT ROWID;
        CREATE TABLE IF NOT EXISTS ingest_runs (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          family TEXT NOT NULL,
          rows_inserted INTEGER NOT NULL,
          files_loaded INTEGER NOT NULL,
          files_skipped INTEGER NOT NULL,
          mode TEXT NOT NULL,
          finished_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        );
        ",
    )?;
    let version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if version == 0 {
        conn.execute_batch(&format!("PRAGMA user_version={SQLITE_SCHEMA_VERSION};"))?;
        conn.execute(
            "INSERT OR REPLACE INTO pulse_meta (k, v) VALUES ('schema_version', ?1)",
            params![SQLITE_SCHEMA_VERSION.to_string()],
        )?;
    } else if version != SQLITE_SCHEMA_VERSION {
        return Err(IngestError::new(
            IngestErrorCode::Store,
            format!(
                "store {} has schema version {version}, expected {SQLITE_SCHEMA_VERSION}",
                path.display()
            ),
        ));
    }
    Ok(conn)
}

pub fn ensure_schema(conn: &Connection, schema: &TableSchema) -> Result<(), IngestError> {
    conn.execute_batch(&format!(
        "{};\n{};",
        schema.create_table_sql(),
        schema.create_index_sql()
    ))?;
    Ok(())
}

/// Inserts the whole batch and the audit row in one transaction. In replace
/// mode the table is cleared first, inside the same transaction.
pub fn persist_family(
    conn: &mut Connection,
    schema: &TableSchema,
    records: &[FlatRecord],
    audit: &RunAudit<'_>,
) -> Result<u64, IngestError> {
    let tx = conn.transaction()?;
    if audit.mode == LoadMode::Replace {
        tx.execute(&format!("DELETE FROM {}", schema.name), [])?;
    }
    {
        let mut stmt = tx.prepare(&schema.insert_sql())?;
        for record in records {
            if record.metrics.kind() != schema.metrics_kind {
                return Err(IngestError::new(
                    IngestErrorCode::Validation,
                    format!(
                        "record for {} does not fit table {}",
                        record.key, schema.name
                    ),
                ));
            }
            stmt.execute(params_from_iter(record_values(record)))?;
        }
    }
    tx.execute(
        "INSERT INTO ingest_runs (family, rows_inserted, files_loaded, files_skipped, mode)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            audit.family,
            records.len() as i64,
            audit.files_loaded as i64,
            audit.files_skipped as i64,
            audit.mode.as_str()
        ],
    )?;
    tx.execute(
        "INSERT OR REPLACE INTO pulse_meta (k, v) VALUES (?1, ?2)",
        params![format!("last_ingest_mode.{}", schema.name), audit.mode.as_str()],
    )?;
    tx.commit()?;
    Ok(records.len() as u64)
}

fn record_values(record: &FlatRecord) -> Vec<Value> {
    let mut values = vec![
        Value::Text(record.key.state.as_str().to_string()),
        Value::Text(record.key.year.as_str().to_string()),
        Value::Integer(i64::from(record.key.quarter.get())),
        Value::Text(record.label.clone()),
    ];
    values.extend(record.metrics.values().into_iter().map(|v| match v {
        MetricValue::Integer(i) => Value::Integer(i),
        MetricValue::Real(r) => Value::Real(r),
    }));
    values
}

/// Row count and count-column sum of a stored family table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableTotals {
    pub rows: i64,
    /// `None` when the column sum does not fit in an `i64`.
    pub count_sum: Option<i64>,
}

/// Totals of a family table, `None` when the table has not been created yet.
pub fn table_totals(
    conn: &Connection,
    schema: &TableSchema,
) -> Result<Option<TableTotals>, IngestError> {
    let exists: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
            params![schema.name],
            |r| r.get(0),
        )
        .optional()?;
    if exists.is_none() {
        return Ok(None);
    }
    // SQLite's SUM raises on integer overflow; fold in Rust instead.
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM {}",
        schema.count_column, schema.name
    ))?;
    let mut rows = stmt.query([])?;
    let mut totals = TableTotals {
        rows: 0,
        count_sum: Some(0),
    };
    while let Some(row) = rows.next()? {
        let value: Option<i64> = row.get(0)?;
        totals.rows += 1;
        totals.count_sum = totals
            .count_sum
            .and_then(|sum| sum.checked_add(value.unwrap_or(0)));
    }
    Ok(Some(totals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_model::{Family, Metrics, PeriodKey, Quarter, StateName, Year};
    use tempfile::tempdir;

    fn record(label: &str, count: i64) -> FlatRecord {
        let key = PeriodKey::new(
            StateName::parse("goa").expect("state"),
            Year::parse("2021").expect("year"),
            Quarter::new(2).expect("quarter"),
        );
        FlatRecord::new(
            key,
            label,
            Metrics::CountAmount {
                count,
                amount: count as f64 * 10.0,
            },
        )
    }

    fn totals(rows: i64, count_sum: i64) -> TableTotals {
        TableTotals {
            rows,
            count_sum: Some(count_sum),
        }
    }

    fn audit(mode: LoadMode) -> RunAudit<'static> {
        RunAudit {
            family: "aggregated_transaction",
            files_loaded: 1,
            files_skipped: 0,
            mode,
        }
    }

    #[test]
    fn store_is_stamped_with_schema_version() {
        let tmp = tempdir().expect("tmp");
        let conn = open_store(&tmp.path().join("nested/pulse.sqlite")).expect("open");
        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |r| r.get(0))
            .expect("version");
        assert_eq!(version, SQLITE_SCHEMA_VERSION);
        let meta: String = conn
            .query_row("SELECT v FROM pulse_meta WHERE k='schema_version'", [], |r| r.get(0))
            .expect("meta");
        assert_eq!(meta, "1");
    }

    #[test]
    fn foreign_schema_version_is_rejected() {
        let tmp = tempdir().expect("tmp");
        let path = tmp.path().join("pulse.sqlite");
        Connection::open(&path)
            .expect("open")
            .execute_batch("PRAGMA user_version=7;")
            .expect("stamp");
        let err = open_store(&path).expect_err("must reject");
        assert_eq!(err.code, IngestErrorCode::Store);
    }

    #[test]
    fn replace_mode_clears_before_insert() {
        let tmp = tempdir().expect("tmp");
        let mut conn = open_store(&tmp.path().join("pulse.sqlite")).expect("open");
        let schema = Family::AggregatedTransaction.schema();
        ensure_schema(&conn, schema).expect("schema");
        let batch = vec![record("Recharge & bill payments", 5), record("Others", 7)];

        persist_family(&mut conn, schema, &batch, &audit(LoadMode::Append)).expect("first");
        persist_family(&mut conn, schema, &batch, &audit(LoadMode::Append)).expect("second");
        assert_eq!(table_totals(&conn, schema).expect("totals"), Some(totals(4, 24)));

        persist_family(&mut conn, schema, &batch, &audit(LoadMode::Replace)).expect("replace");
        assert_eq!(table_totals(&conn, schema).expect("totals"), Some(totals(2, 12)));

        let runs: i64 = conn
            .query_row("SELECT COUNT(*) FROM ingest_runs", [], |r| r.get(0))
            .expect("runs");
        assert_eq!(runs, 3);
    }

    #[test]
    fn mismatched_metrics_roll_back_the_batch() {
        let tmp = tempdir().expect("tmp");
        let mut conn = open_store(&tmp.path().join("pulse.sqlite")).expect("open");
        let schema = Family::MapUser.schema();
        ensure_schema(&conn, schema).expect("schema");
        let err = persist_family(&mut conn, schema, &[record("x", 1)], &audit(LoadMode::Append))
            .expect_err("kind mismatch");
        assert_eq!(err.code, IngestErrorCode::Validation);
        assert_eq!(table_totals(&conn, schema).expect("totals"), Some(totals(0, 0)));
    }

    #[test]
    fn overflowing_count_sum_is_reported_as_none() {
        let tmp = tempdir().expect("tmp");
        let mut conn = open_store(&tmp.path().join("pulse.sqlite")).expect("open");
        let schema = Family::AggregatedTransaction.schema();
        ensure_schema(&conn, schema).expect("schema");
        let batch = vec![record("Peer-to-peer payments", i64::MAX), record("Others", 1)];
        persist_family(&mut conn, schema, &batch, &audit(LoadMode::Append)).expect("persist");
        assert_eq!(
            table_totals(&conn, schema).expect("totals"),
            Some(TableTotals {
                rows: 2,
                count_sum: None,
            })
        );
    }

    #[test]
    fn totals_are_none_for_missing_table() {
        let conn = Connection::open_in_memory().expect("mem");
        assert_eq!(
            table_totals(&conn, Family::TopUser.schema()).expect("totals"),
            None
        );
    }
}
