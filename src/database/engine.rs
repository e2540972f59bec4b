//! DuckDB-backed tabular row source
//!
//! Runs a SQL query against an in-memory or file database. One statement is
//! driven to its end on a reader thread that owns the connection; rows reach
//! the export worker through a bounded channel.

use crate::error::{Error, Result};
use crate::source::{Row, RowIter, RowKind, RowSource, SchemaHint};
use crate::value::{IsoDuration, Value};
use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveTime};
use duckdb::types::{TimeUnit, Value as DuckValue};
use crossbeam_channel::Sender;
use duckdb::Connection;
use std::path::Path;

/// Default number of rows read ahead of the export worker
pub const DEFAULT_PREFETCH_ROWS: usize = 1024;

/// SQL query result as a row source
pub struct DuckDbSource {
    conn: Connection,
    sql: String,
    prefetch: usize,
    name: String,
}

impl DuckDbSource {
    /// Query a fresh in-memory database
    pub fn in_memory(sql: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::config(format!("Failed to create DuckDB connection: {e}")))?;
        Ok(Self::new(conn, sql))
    }

    /// Query a database file
    pub fn open(path: impl AsRef<Path>, sql: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let conn = Connection::open(path)?;
        Ok(Self::new(conn, sql))
    }

    /// Query an existing connection
    pub fn new(conn: Connection, sql: impl Into<String>) -> Self {
        Self {
            conn,
            sql: sql.into().trim().trim_end_matches(';').to_string(),
            prefetch: DEFAULT_PREFETCH_ROWS,
            name: "query".to_string(),
        }
    }

    /// Run setup statements (DDL, inserts, ATTACH) before the query
    pub fn with_setup(self, statements: &str) -> Result<Self> {
        self.conn
            .execute_batch(statements)
            .map_err(|e| Error::source(format!("Setup statements failed: {e}")))?;
        Ok(self)
    }

    /// Set how many rows the reader may run ahead of the export worker
    #[must_use]
    pub fn with_prefetch(mut self, rows: usize) -> Self {
        self.prefetch = rows.max(1);
        self
    }

    /// Set the name used in logs
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl RowSource for DuckDbSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn describe_for_schema(&self) -> Result<SchemaHint> {
        Ok(SchemaHint::ScanRows)
    }

    fn produce(self: Box<Self>) -> Result<RowIter> {
        let Self {
            conn,
            sql,
            prefetch,
            name,
        } = *self;
        let (tx, rx) = crossbeam_channel::bounded(prefetch);
        std::thread::Builder::new()
            .name(format!("duckdb-{name}"))
            .spawn(move || read_query(&conn, &sql, &tx))
            .map_err(|e| Error::WorkerSpawn {
                message: format!("Failed to start query reader: {e}"),
            })?;
        Ok(Box::new(rx.into_iter()))
    }
}

/// Drive one statement to its end, handing rows to the consumer
///
/// Stops early once the consumer is gone. A query error is sent as the last
/// item.
fn read_query(conn: &Connection, sql: &str, tx: &Sender<Result<Row>>) {
    if let Err(e) = send_rows(conn, sql, tx) {
        let _ = tx.send(Err(e));
    }
}

fn send_rows(conn: &Connection, sql: &str, tx: &Sender<Result<Row>>) -> Result<()> {
    tracing::debug!("Executing query: {}", sql);
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    let names = rows.as_ref().map(duckdb::Statement::column_names).unwrap_or_default();

    let mut sent = 0_usize;
    while let Some(row) = rows.next()? {
        let mut out = Row::new(RowKind::Record);
        for (idx, name) in names.iter().enumerate() {
            let value: DuckValue = row.get(idx)?;
            out.insert(name.clone(), duckdb_value_to_value(value));
        }
        if tx.send(Ok(out)).is_err() {
            tracing::debug!(rows = sent, "Query consumer gone, stopping read");
            return Ok(());
        }
        sent += 1;
    }
    tracing::debug!(rows = sent, "Query finished");
    Ok(())
}

/// Convert a DuckDB value into the row value domain
pub fn duckdb_value_to_value(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(i) => Value::Int(i.into()),
        DuckValue::SmallInt(i) => Value::Int(i.into()),
        DuckValue::Int(i) => Value::Int(i.into()),
        DuckValue::BigInt(i) => Value::Int(i),
        DuckValue::UTinyInt(i) => Value::Int(i.into()),
        DuckValue::USmallInt(i) => Value::Int(i.into()),
        DuckValue::UInt(i) => Value::Int(i.into()),
        // Out-of-range integers keep their digits as text
        DuckValue::HugeInt(i) => {
            i64::try_from(i).map_or_else(|_| Value::String(i.to_string()), Value::Int)
        }
        DuckValue::UBigInt(i) => {
            i64::try_from(i).map_or_else(|_| Value::String(i.to_string()), Value::Int)
        }
        DuckValue::Float(f) => Value::Float(f64::from(f)),
        DuckValue::Double(f) => Value::Float(f),
        DuckValue::Decimal(d) => {
            let text = d.to_string();
            text.parse::<f64>().map_or(Value::String(text), Value::Float)
        }
        DuckValue::Text(s) | DuckValue::Enum(s) => Value::String(s),
        DuckValue::Blob(b) => Value::String(base64::engine::general_purpose::STANDARD.encode(b)),
        DuckValue::Timestamp(unit, v) => {
            let micros = to_micros(unit, v);
            let secs = micros.div_euclid(1_000_000);
            let nsecs = (micros.rem_euclid(1_000_000) * 1000) as u32;
            DateTime::from_timestamp(secs, nsecs)
                .map_or(Value::Int(v), |dt| Value::DateTime(dt.fixed_offset()))
        }
        DuckValue::Date32(d) => {
            // 719_163 days from 0001-01-01 to 1970-01-01
            NaiveDate::from_num_days_from_ce_opt(d + 719_163)
                .map_or(Value::Int(d.into()), Value::Date)
        }
        DuckValue::Time64(unit, t) => {
            let micros = to_micros(unit, t);
            NaiveTime::from_num_seconds_from_midnight_opt(
                (micros / 1_000_000) as u32,
                ((micros % 1_000_000) * 1000) as u32,
            )
            .map_or(Value::Int(t), Value::LocalTime)
        }
        DuckValue::Interval { months, days, nanos } => Value::Duration(IsoDuration::new(
            months.into(),
            days.into(),
            nanos.div_euclid(1_000_000_000),
            nanos.rem_euclid(1_000_000_000) as i32,
        )),
        DuckValue::List(items) | DuckValue::Array(items) => {
            Value::List(items.into_iter().map(duckdb_value_to_value).collect())
        }
        DuckValue::Struct(fields) => Value::map(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), duckdb_value_to_value(v.clone()))),
        ),
        DuckValue::Map(entries) => Value::map(entries.iter().map(|(k, v)| {
            (
                duckdb_value_to_value(k.clone()).to_text(),
                duckdb_value_to_value(v.clone()),
            )
        })),
        DuckValue::Union(inner) => duckdb_value_to_value(*inner),
        #[allow(unreachable_patterns)]
        other => Value::String(format!("{other:?}")),
    }
}

fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}
