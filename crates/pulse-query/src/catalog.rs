// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;
use std::path::Path;

use pulse_model::{Family, StateName, Year};
use rusqlite::{Connection, OpenFlags};

use crate::{QueryError, QueryErrorCode};

/// Opens an existing store without write access.
pub fn open_read_only(path: &Path) -> Result<Connection, QueryError> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| {
        QueryError::new(
            QueryErrorCode::Store,
            format!("cannot open store {}: {e}", path.display()),
        )
    })
}

/// Family tables present in the store.
pub fn loaded_tables(conn: &Connection) -> Result<Vec<&'static str>, QueryError> {
    let mut stmt = conn.prepare_cached("SELECT name FROM sqlite_master WHERE type='table'")?;
    let present: BTreeSet<String> = stmt
        .query_map([], |r| r.get::<_, String>(0))?
        .collect::<Result<_, _>>()?;
    Ok(Family::ALL
        .iter()
        .map(|f| f.as_str())
        .filter(|t| present.contains(*t))
        .collect())
}

fn distinct_values(conn: &Connection, column: &str) -> Result<BTreeSet<String>, QueryError> {
    let mut out = BTreeSet::new();
    for table in loaded_tables(conn)? {
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT DISTINCT {column} FROM {table} WHERE {column} IS NOT NULL"
        ))?;
        let values = stmt
            .query_map([], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        out.extend(values);
    }
    Ok(out)
}

/// Years seen in any loaded table, ascending. Unparseable values are ignored.
pub fn available_years(conn: &Connection) -> Result<Vec<Year>, QueryError> {
    Ok(distinct_values(conn, "Year")?
        .iter()
        .filter_map(|y| Year::parse(y).ok())
        .collect())
}

/// States seen in any loaded table, ascending.
pub fn available_states(conn: &Connection) -> Result<Vec<StateName>, QueryError> {
    Ok(distinct_values(conn, "State")?
        .iter()
        .filter_map(|s| StateName::parse(s).ok())
        .collect())
}
