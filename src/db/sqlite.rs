//! Embedded SQLite adapter built on `rusqlite`.
//!
//! Statements that modify data open a transaction implicitly when the
//! connection is in autocommit mode, so `commit` and `rollback` behave the
//! way they do with a client-server database.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, ToSql};

use super::{DriverConnection, DriverCursor, ResultBuffer, SQLITE_PATH_VAR};
use crate::error::{Error, Result};
use crate::value::{RawRow, Value};

/// Environment variable names read by [`connect_from_env`].
#[derive(Debug, Clone)]
pub struct SqliteEnv {
    pub path: String,
}

impl Default for SqliteEnv {
    fn default() -> Self {
        Self {
            path: SQLITE_PATH_VAR.to_string(),
        }
    }
}

type Shared = Arc<Mutex<Option<rusqlite::Connection>>>;

fn with_conn<T>(shared: &Shared, f: impl FnOnce(&rusqlite::Connection) -> rusqlite::Result<T>) -> Result<T> {
    let guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
    let conn = guard.as_ref().ok_or(Error::Closed { resource: "connection" })?;
    f(conn).map_err(Error::driver)
}

/// Open (or create) the database file at `path`.
pub fn connect(path: impl AsRef<Path>) -> Result<SqliteConnection> {
    let path = path.as_ref();
    let conn = rusqlite::Connection::open(path).map_err(Error::driver)?;
    tracing::debug!(target: "typed_sql::driver", path = %path.display(), "opened sqlite database");
    Ok(SqliteConnection::from_raw(conn, path.display().to_string()))
}

/// Open a private in-memory database.
pub fn connect_in_memory() -> Result<SqliteConnection> {
    let conn = rusqlite::Connection::open_in_memory().map_err(Error::driver)?;
    Ok(SqliteConnection::from_raw(conn, ":memory:".to_string()))
}

/// Open the database named by the path variable in `env`.
pub fn connect_from_env(env: &SqliteEnv) -> Result<SqliteConnection> {
    let path = std::env::var(&env.path)
        .map_err(|_| Error::Config(format!("environment variable {} is not set", env.path)))?;
    connect(PathBuf::from(path))
}

pub struct SqliteConnection {
    conn: Shared,
    path: String,
}

impl SqliteConnection {
    pub fn from_raw(conn: rusqlite::Connection, path: String) -> Self {
        Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            path,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl DriverConnection for SqliteConnection {
    type Cursor = SqliteCursor;

    fn cursor(&self) -> Result<SqliteCursor> {
        with_conn(&self.conn, |_| Ok(()))?;
        Ok(SqliteCursor {
            conn: Arc::clone(&self.conn),
            result: ResultBuffer::empty(),
            closed: false,
        })
    }

    fn commit(&self) -> Result<()> {
        with_conn(&self.conn, |conn| {
            if conn.is_autocommit() {
                return Ok(());
            }
            conn.execute_batch("COMMIT")
        })
    }

    fn rollback(&self) -> Result<()> {
        with_conn(&self.conn, |conn| {
            if conn.is_autocommit() {
                return Ok(());
            }
            conn.execute_batch("ROLLBACK")
        })
    }

    fn close(&mut self) -> Result<()> {
        let taken = self.conn.lock().unwrap_or_else(PoisonError::into_inner).take();
        match taken {
            Some(conn) => conn.close().map_err(|(_, e)| Error::driver(e)),
            None => Ok(()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

pub struct SqliteCursor {
    conn: Shared,
    result: ResultBuffer,
    closed: bool,
}

impl SqliteCursor {
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed { resource: "cursor" });
        }
        Ok(())
    }
}

impl DriverCursor for SqliteCursor {
    fn execute(&mut self, operation: &str, params: &[Value]) -> Result<()> {
        self.ensure_open()?;
        self.result = with_conn(&self.conn, |conn| run(conn, operation, params))?;
        Ok(())
    }

    fn executemany(&mut self, operation: &str, params_seq: &[Vec<Value>]) -> Result<()> {
        self.ensure_open()?;
        let mut total = ResultBuffer::empty();
        for params in params_seq {
            total.accumulate(with_conn(&self.conn, |conn| run(conn, operation, params))?);
        }
        self.result = total;
        Ok(())
    }

    fn fetchone(&mut self) -> Result<Option<RawRow>> {
        self.ensure_open()?;
        Ok(self.result.next())
    }

    fn fetchmany(&mut self, size: usize) -> Result<Vec<RawRow>> {
        self.ensure_open()?;
        Ok(self.result.take(size))
    }

    fn fetchall(&mut self) -> Result<Vec<RawRow>> {
        self.ensure_open()?;
        Ok(self.result.drain())
    }

    fn rowcount(&self) -> i64 {
        self.result.rowcount()
    }

    fn description(&self) -> Option<Vec<String>> {
        self.result.columns()
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.result = ResultBuffer::empty();
        Ok(())
    }
}

fn is_write(operation: &str) -> bool {
    let keyword = operation
        .trim_start()
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default();
    ["INSERT", "UPDATE", "DELETE", "REPLACE"]
        .iter()
        .any(|k| keyword.eq_ignore_ascii_case(k))
}

fn run(conn: &rusqlite::Connection, operation: &str, params: &[Value]) -> rusqlite::Result<ResultBuffer> {
    if is_write(operation) && conn.is_autocommit() {
        conn.execute_batch("BEGIN")?;
    }

    let mut stmt = conn.prepare(operation)?;
    let width = stmt.column_count();
    if width == 0 {
        let changed = stmt.execute(params_from_iter(params))?;
        return Ok(ResultBuffer::affected(changed as u64));
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query(params_from_iter(params))?;
    let mut collected = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            let value: SqlValue = row.get(i)?;
            values.push(Value::from(value));
        }
        collected.push(values);
    }
    Ok(ResultBuffer::rows(columns, collected))
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Bool(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Value::Int(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Float(f) => ToSqlOutput::Owned(SqlValue::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

impl From<SqlValue> for Value {
    fn from(value: SqlValue) -> Self {
        match value {
            SqlValue::Null => Value::Null,
            SqlValue::Integer(i) => Value::Int(i),
            SqlValue::Real(f) => Value::Float(f),
            SqlValue::Text(s) => Value::Text(s),
            SqlValue::Blob(b) => Value::Bytes(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use rstest::rstest;
    use serial_test::serial;

    fn people() -> SqliteConnection {
        let conn = connect_in_memory().unwrap();
        let mut cur = conn.cursor().unwrap();
        cur.execute("CREATE TABLE people (id INTEGER, name TEXT, photo BLOB)", &[])
            .unwrap();
        cur.executemany(
            "INSERT INTO people VALUES (?1, ?2, ?3)",
            &[
                params![1, "ada", Value::Null],
                params![2, "grace", vec![0xde_u8, 0xad]],
            ],
        )
        .unwrap();
        conn.commit().unwrap();
        conn
    }

    #[test]
    fn test_select_buffers_rows_and_description() {
        let conn = people();
        let mut cur = conn.cursor().unwrap();
        cur.execute("SELECT id, name, photo FROM people ORDER BY id", &[])
            .unwrap();
        assert_eq!(
            cur.description(),
            Some(vec!["id".to_string(), "name".to_string(), "photo".to_string()])
        );
        assert_eq!(cur.rowcount(), 2);
        assert_eq!(
            cur.fetchone().unwrap(),
            Some(vec![Value::Int(1), Value::Text("ada".into()), Value::Null])
        );
        assert_eq!(
            cur.fetchall().unwrap(),
            vec![vec![
                Value::Int(2),
                Value::Text("grace".into()),
                Value::Bytes(vec![0xde, 0xad])
            ]]
        );
        assert_eq!(cur.fetchone().unwrap(), None);
    }

    #[test]
    fn test_executemany_accumulates_rowcount() {
        let conn = people();
        let mut cur = conn.cursor().unwrap();
        cur.executemany(
            "UPDATE people SET name = ?1 WHERE id = ?2",
            &[params!["x", 1], params!["y", 2], params!["z", 3]],
        )
        .unwrap();
        assert_eq!(cur.rowcount(), 2);
        assert_eq!(cur.description(), None);
    }

    #[test]
    fn test_rollback_discards_implicit_transaction() {
        let conn = people();
        let mut cur = conn.cursor().unwrap();
        cur.execute("DELETE FROM people", &[]).unwrap();
        conn.rollback().unwrap();
        cur.execute("SELECT count(*) FROM people", &[]).unwrap();
        assert_eq!(cur.fetchone().unwrap(), Some(vec![Value::Int(2)]));
    }

    #[test]
    fn test_closed_connection_rejects_cursor() {
        let mut conn = connect_in_memory().unwrap();
        let mut cur = conn.cursor().unwrap();
        conn.close().unwrap();
        conn.close().unwrap();
        assert!(matches!(conn.cursor(), Err(Error::Closed { .. })));
        assert!(matches!(cur.execute("SELECT 1", &[]), Err(Error::Closed { .. })));
    }

    #[test]
    fn test_driver_errors_propagate_unchanged() {
        let conn = connect_in_memory().unwrap();
        let mut cur = conn.cursor().unwrap();
        let err = cur.execute("SELEC nonsense", &[]).unwrap_err();
        assert!(matches!(err, Error::Driver(_)));
        assert!(err.to_string().contains("syntax error"));
    }

    #[rstest]
    #[case("insert into t values (1)", true)]
    #[case("  UPDATE t SET a = 1", true)]
    #[case("Replace INTO t VALUES (1)", true)]
    #[case("SELECT * FROM t", false)]
    #[case("CREATE TABLE t (a)", false)]
    fn test_is_write(#[case] operation: &str, #[case] expected: bool) {
        assert_eq!(is_write(operation), expected);
    }

    #[test]
    #[serial]
    fn test_connect_from_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.sqlite");
        let env = SqliteEnv {
            path: "TYPED_SQL_TEST_SQLITE_PATH".to_string(),
        };
        unsafe {
            std::env::set_var(&env.path, &path);
        }
        let conn = connect_from_env(&env).unwrap();
        assert_eq!(conn.path(), path.display().to_string());
        unsafe {
            std::env::remove_var(&env.path);
        }
        assert!(matches!(connect_from_env(&env), Err(Error::Config(_))));
    }
}
