//! Bundled embedded engine driver (SQLite through rusqlite)
//!
//! Column type codes come from the declared column type when the engine
//! reports one, and otherwise from the storage class of the first non-null
//! value in the column. Values come back in the engine's generic numeric
//! family (`Long`/`Double`) whatever the declared width.
//!
//! Temporal parameters are stored as `YYYY-MM-DD HH:MM:SS.fff` text read
//! as UTC milliseconds since 1970-01-01, so the engine's own date functions
//! and `CURRENT_TIMESTAMP` defaults interoperate with bound values.

use std::io;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use tracing::debug;

use sqlbridge_core::{isolation, ForeignBlob, ForeignValue, TypeCode};

use crate::driver::{Driver, ForeignColumn, ForeignConnection, ForeignResultSet};
use crate::error::{DriverError, DriverResult};
use crate::url::{redact, ConnectionUrl, UrlTarget};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const TEMPORAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Driver for `sqlite:` connection strings
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl SqliteDriver {
    pub fn new() -> Self {
        Self
    }

    /// Open a typed connection from a parsed url
    pub fn open(&self, url: &ConnectionUrl) -> DriverResult<SqliteConnection> {
        let mut flags = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if url.read_only {
            flags |= OpenFlags::SQLITE_OPEN_READ_ONLY;
        } else {
            flags |= OpenFlags::SQLITE_OPEN_READ_WRITE;
            if !url.if_exists {
                flags |= OpenFlags::SQLITE_OPEN_CREATE;
            }
        }

        let conn = match &url.target {
            UrlTarget::Memory(None) => Connection::open_in_memory()?,
            UrlTarget::Memory(Some(name)) => Connection::open_with_flags(
                format!("file:{}?mode=memory&cache=shared", name),
                flags,
            )?,
            UrlTarget::File(path) => Connection::open_with_flags(path, flags)?,
        };
        conn.busy_timeout(BUSY_TIMEOUT)?;

        debug!(target: "sqlbridge::driver", url = %url, "Opened sqlite connection");
        Ok(SqliteConnection {
            conn: Some(conn),
            label: url.to_string(),
        })
    }
}

impl Driver for SqliteDriver {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn accepts(&self, url: &str) -> bool {
        ConnectionUrl::parse(url).is_ok()
    }

    fn connect(&self, url: &str) -> DriverResult<Box<dyn ForeignConnection>> {
        let parsed = ConnectionUrl::parse(url)?;
        let conn = self.open(&parsed).map_err(|e| {
            debug!(target: "sqlbridge::driver", url = %redact(url), error = %e, "Connect failed");
            e
        })?;
        Ok(Box::new(conn))
    }
}

/// An open SQLite connection
pub struct SqliteConnection {
    conn: Option<Connection>,
    label: String,
}

impl SqliteConnection {
    fn conn(&self) -> DriverResult<&Connection> {
        self.conn.as_ref().ok_or(DriverError::Closed)
    }

    /// Redacted url this connection was opened with
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("label", &self.label)
            .field("closed", &self.conn.is_none())
            .finish()
    }
}

impl ForeignConnection for SqliteConnection {
    fn begin(&mut self, level: i32) -> DriverResult<()> {
        let conn = self.conn()?;
        conn.pragma_update(
            None,
            "read_uncommitted",
            level == isolation::TRANSACTION_READ_UNCOMMITTED,
        )?;
        if level == isolation::TRANSACTION_SERIALIZABLE {
            conn.execute_batch("BEGIN IMMEDIATE")?;
        } else {
            conn.execute_batch("BEGIN DEFERRED")?;
        }
        Ok(())
    }

    fn commit(&mut self) -> DriverResult<()> {
        self.conn()?.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> DriverResult<()> {
        self.conn()?.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn execute_update(&mut self, sql: &str, params: Vec<ForeignValue>) -> DriverResult<u64> {
        let values = bind_all(params)?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let affected = stmt.execute(params_from_iter(values))?;
        Ok(affected as u64)
    }

    fn execute_query(
        &mut self,
        sql: &str,
        params: Vec<ForeignValue>,
    ) -> DriverResult<ForeignResultSet> {
        let values = bind_all(params)?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;

        let declared: Vec<(String, Option<String>)> = stmt
            .columns()
            .iter()
            .map(|c| (c.name().to_string(), c.decl_type().map(str::to_string)))
            .collect();
        let width = declared.len();

        let mut raw: Vec<Vec<SqlValue>> = Vec::new();
        let mut rows = stmt.query(params_from_iter(values))?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(row.get::<_, SqlValue>(i)?);
            }
            raw.push(cells);
        }

        let columns: Vec<ForeignColumn> = declared
            .into_iter()
            .enumerate()
            .map(|(i, (name, declared_type))| {
                let type_code = match &declared_type {
                    Some(decl) => declared_type_code(decl),
                    None => storage_type_code(raw.iter().map(|r| &r[i])),
                };
                ForeignColumn {
                    name,
                    type_code,
                    declared_type,
                }
            })
            .collect();

        let rows = raw
            .into_iter()
            .map(|cells| {
                cells
                    .into_iter()
                    .zip(&columns)
                    .map(|(cell, col)| to_foreign(cell, col.type_code))
                    .collect()
            })
            .collect();

        Ok(ForeignResultSet::new(columns, rows))
    }

    fn close(&mut self) -> DriverResult<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| DriverError::Sqlite(e))?;
            debug!(target: "sqlbridge::driver", url = %self.label, "Closed sqlite connection");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.conn.is_none()
    }
}

// =============================================================================
// Value mapping
// =============================================================================

fn bind_all(params: Vec<ForeignValue>) -> DriverResult<Vec<SqlValue>> {
    params
        .into_iter()
        .enumerate()
        .map(|(i, p)| bind(i + 1, p))
        .collect()
}

fn bind(index: usize, value: ForeignValue) -> DriverResult<SqlValue> {
    Ok(match value {
        ForeignValue::Null => SqlValue::Null,
        ForeignValue::Boolean(b) => SqlValue::Integer(i64::from(b)),
        ForeignValue::Byte(v) => SqlValue::Integer(i64::from(v)),
        ForeignValue::Short(v) => SqlValue::Integer(i64::from(v)),
        ForeignValue::Int(v) => SqlValue::Integer(i64::from(v)),
        ForeignValue::Long(v) => SqlValue::Integer(v),
        ForeignValue::Float(v) => SqlValue::Real(f64::from(v)),
        ForeignValue::Double(v) => SqlValue::Real(v),
        ForeignValue::Decimal(text) | ForeignValue::String(text) => SqlValue::Text(text),
        ForeignValue::Bytes(b) => SqlValue::Blob(b),
        ForeignValue::Blob(blob) => SqlValue::Blob(read_blob(blob)?),
        ForeignValue::Date(ms) | ForeignValue::Time(ms) | ForeignValue::Timestamp(ms) => {
            let at = DateTime::from_timestamp_millis(ms).ok_or_else(|| {
                DriverError::InvalidParameter {
                    index,
                    reason: format!("{} ms is outside the engine's date range", ms),
                }
            })?;
            SqlValue::Text(at.naive_utc().format(TEMPORAL_FORMAT).to_string())
        }
        ForeignValue::Array(_) => {
            return Err(DriverError::Unsupported {
                reason: format!("array parameter at position {}", index),
            })
        }
    })
}

fn read_blob(mut blob: ForeignBlob) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        match blob.read_chunk(&mut chunk)? {
            0 => return Ok(out),
            n => out.extend_from_slice(&chunk[..n]),
        }
    }
}

/// Type code for a declared column type.
///
/// `INTEGER` columns (rowids included) hold 64-bit values here, so they
/// report as BIGINT. Narrower declarations keep their code.
fn declared_type_code(decl: &str) -> TypeCode {
    match TypeCode::from_sql_name(decl) {
        TypeCode::INTEGER => TypeCode::BIGINT,
        code => code,
    }
}

fn storage_type_code<'a>(cells: impl Iterator<Item = &'a SqlValue>) -> TypeCode {
    for cell in cells {
        match cell {
            SqlValue::Null => continue,
            SqlValue::Integer(_) => return TypeCode::BIGINT,
            SqlValue::Real(_) => return TypeCode::DOUBLE,
            SqlValue::Text(_) => return TypeCode::VARCHAR,
            SqlValue::Blob(_) => return TypeCode::BLOB,
        }
    }
    TypeCode::NULL
}

fn temporal(code: TypeCode, ms: i64) -> ForeignValue {
    match code {
        TypeCode::DATE => ForeignValue::Date(ms),
        TypeCode::TIME => ForeignValue::Time(ms),
        _ => ForeignValue::Timestamp(ms),
    }
}

/// Milliseconds since 1970-01-01T00:00:00 for the engine's date/time text
fn parse_temporal(text: &str) -> Option<i64> {
    let t = text.trim();
    let at = NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(t, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .or_else(|| {
            let time = NaiveTime::parse_from_str(t, "%H:%M:%S%.f").ok()?;
            Some(DateTime::UNIX_EPOCH.date_naive().and_time(time))
        })?;
    Some(at.and_utc().timestamp_millis())
}

fn to_foreign(cell: SqlValue, code: TypeCode) -> ForeignValue {
    match cell {
        SqlValue::Null => ForeignValue::Null,
        SqlValue::Integer(i) if code.is_temporal() => temporal(code, i),
        SqlValue::Integer(i) if code == TypeCode::BOOLEAN => ForeignValue::Boolean(i != 0),
        SqlValue::Integer(i) => ForeignValue::Long(i),
        SqlValue::Real(f) if code.is_temporal() => temporal(code, f as i64),
        SqlValue::Real(f) => ForeignValue::Double(f),
        SqlValue::Text(s) if code == TypeCode::DECIMAL || code == TypeCode::NUMERIC => {
            ForeignValue::Decimal(s)
        }
        SqlValue::Text(s) if code.is_temporal() => match parse_temporal(&s) {
            Some(ms) => temporal(code, ms),
            None => ForeignValue::String(s),
        },
        SqlValue::Text(s) => ForeignValue::String(s),
        SqlValue::Blob(b) if code == TypeCode::BLOB => {
            ForeignValue::Blob(ForeignBlob::from_bytes(b))
        }
        SqlValue::Blob(b) => ForeignValue::Bytes(b),
    }
}
