//! DuckDB connection wrapper with bounded-time query execution.
//!
//! Every query runs on a cloned handle in a worker thread while the caller
//! waits up to the configured timeout. A query that outlives its timeout keeps
//! running to completion in the background and its result is dropped.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{NaiveDate, TimeDelta};
use duckdb::{types::ValueRef, Connection as DuckDbConnection, ToSql};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::DEFAULT_QUERY_TIMEOUT;
use crate::error::{ExplorerError, Result};
use crate::sql_builder::QueryParam;

/// One result row, column name to JSON value.
pub type RowMap = HashMap<String, serde_json::Value>;

/// Wraps a DuckDB database and executes parameterized queries against it.
pub struct Connection {
    conn: Mutex<DuckDbConnection>,
    timeout: Duration,
    registered_tables: Mutex<HashSet<String>>,
}

impl Connection {
    /// Open (or create) a DuckDB database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        debug!(path = %path.display(), "opening DuckDB database");
        Ok(Self::from_raw(DuckDbConnection::open(path)?))
    }

    /// Open an in-memory DuckDB database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_raw(DuckDbConnection::open_in_memory()?))
    }

    fn from_raw(conn: DuckDbConnection) -> Self {
        Self {
            conn: Mutex::new(conn),
            timeout: DEFAULT_QUERY_TIMEOUT,
            registered_tables: Mutex::new(HashSet::new()),
        }
    }

    /// Set how long a single query may run before [`ExplorerError::Timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute SQL and return results as a `Vec` of [`RowMap`]s.
    pub fn execute(&self, sql: &str, params: &[QueryParam]) -> Result<Vec<RowMap>> {
        let worker = self.conn.lock().try_clone()?;
        let sql_owned = sql.to_string();
        let params_owned = params.to_vec();
        let (tx, rx) = mpsc::channel();

        let started = Instant::now();
        thread::spawn(move || {
            let result = run_query(&worker, &sql_owned, &params_owned);
            // The receiver is gone if the caller already timed out.
            let _ = tx.send(result);
        });

        match rx.recv_timeout(self.timeout) {
            Ok(result) => {
                debug!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    rows = result.as_ref().map(|r| r.len()).unwrap_or(0),
                    "query finished"
                );
                result
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(timeout = ?self.timeout, "query timed out");
                Err(ExplorerError::Timeout {
                    query: first_line(sql),
                    timeout: self.timeout,
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(ExplorerError::Task(
                "query worker exited without a result".to_string(),
            )),
        }
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[QueryParam],
    ) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    pub fn execute_scalar(
        &self,
        sql: &str,
        params: &[QueryParam],
    ) -> Result<Option<serde_json::Value>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let bound: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
        let mut rows = stmt.query(bound.as_slice())?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }

    /// Run one or more statements without parameters (DDL, seeding).
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.lock().execute_batch(sql)?;
        Ok(())
    }

    /// Create a DuckDB table from a newline-delimited JSON file.
    pub fn register_table_from_ndjson(&self, table_name: &str, ndjson_path: &str) -> Result<()> {
        let path_fwd = ndjson_path.replace('\\', "/").replace('\'', "''");
        self.execute_batch(&format!(
            "DROP TABLE IF EXISTS {}; \
             CREATE TABLE {} AS SELECT * FROM read_json_auto('{}', format='newline_delimited')",
            table_name, table_name, path_fwd
        ))?;
        self.registered_tables.lock().insert(table_name.to_string());
        debug!(table = table_name, "registered table from NDJSON");
        Ok(())
    }

    /// Check whether a table was registered through this connection.
    pub fn has_table(&self, name: &str) -> bool {
        self.registered_tables.lock().contains(name)
    }

    /// Names of tables registered through this connection.
    pub fn tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registered_tables.lock().iter().cloned().collect();
        names.sort();
        names
    }

    /// Check the catalog for `schema.table`.
    pub fn table_exists(&self, schema: &str, table: &str) -> Result<bool> {
        let count = self.execute_scalar(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = ? AND table_name = ?",
            &[schema.into(), table.into()],
        )?;
        Ok(count.and_then(|v| v.as_i64()).unwrap_or(0) > 0)
    }
}

fn run_query(conn: &DuckDbConnection, sql: &str, params: &[QueryParam]) -> Result<Vec<RowMap>> {
    let mut stmt = conn.prepare(sql)?;
    let bound: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
    let mut rows = stmt.query(bound.as_slice())?;

    // Column metadata is only available once the statement has executed.
    let column_names: Vec<String> = rows
        .as_ref()
        .map(|s| {
            s.column_names()
                .into_iter()
                .map(|c| c.to_string())
                .collect()
        })
        .unwrap_or_default();

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut map = HashMap::with_capacity(column_names.len());
        for (i, name) in column_names.iter().enumerate() {
            map.insert(name.clone(), convert_value_ref(row.get_ref(i)?));
        }
        out.push(map);
    }
    Ok(out)
}

fn first_line(sql: &str) -> String {
    sql.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
        .to_string()
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    use serde_json::Value;

    match val {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(n) => Value::Number(n.into()),
        ValueRef::SmallInt(n) => Value::Number(n.into()),
        ValueRef::Int(n) => Value::Number(n.into()),
        ValueRef::BigInt(n) => Value::Number(n.into()),
        ValueRef::UTinyInt(n) => Value::Number(n.into()),
        ValueRef::USmallInt(n) => Value::Number(n.into()),
        ValueRef::UInt(n) => Value::Number(n.into()),
        ValueRef::UBigInt(n) => Value::Number(n.into()),
        ValueRef::HugeInt(n) => match i64::try_from(n) {
            Ok(i) => Value::Number(i.into()),
            Err(_) => Value::String(n.to_string()),
        },
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).to_string()),
        // Days since the Unix epoch.
        ValueRef::Date32(days) => NaiveDate::from_ymd_opt(1970, 1, 1)
            .zip(TimeDelta::try_days(i64::from(days)))
            .and_then(|(epoch, delta)| epoch.checked_add_signed(delta))
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}
