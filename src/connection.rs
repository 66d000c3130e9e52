//! Connection contract and the live connection.
//!
//! Every shortcut on [`Connection`] opens a fresh cursor and runs the
//! matching cursor method on it, so `conn.execute_map::<User>(sql, &[])` is
//! exactly `conn.cursor()?.execute_map::<User>(sql, &[])`.

use crate::cursor::{Cursor, ExecuteCursor, LiveBackend, LiveCursor};
use crate::db::{AnyConnection, DatabaseConfig, DriverConnection, EnvNames};
use crate::error::{Error, Result};
use crate::mock::Tag;
use crate::row::RowType;
use crate::value::{RawRow, Value};

/// Cursor type returned by the shortcuts of connection `C` for row type `S`.
pub type Mapped<C, S> = <<C as Connection>::Cursor as ExecuteCursor>::Mapped<S>;

pub trait Connection {
    type Cursor: ExecuteCursor<Row = RawRow>;

    fn cursor(&self) -> Result<Self::Cursor>;

    fn commit(&self) -> Result<()>;

    fn rollback(&self) -> Result<()>;

    /// Release the connection. Idempotent.
    fn close(&mut self) -> Result<()>;

    fn execute(&self, operation: &str, params: &[Value]) -> Result<Mapped<Self, RawRow>> {
        self.cursor()?.execute(operation, params)
    }

    fn executemany(&self, operation: &str, params_seq: &[Vec<Value>]) -> Result<Mapped<Self, RawRow>> {
        self.cursor()?.executemany(operation, params_seq)
    }

    fn execute_map<S: RowType>(&self, operation: &str, params: &[Value]) -> Result<Mapped<Self, S>> {
        self.cursor()?.execute_map::<S>(operation, params)
    }

    fn executemany_map<S: RowType>(&self, operation: &str, params_seq: &[Vec<Value>]) -> Result<Mapped<Self, S>> {
        self.cursor()?.executemany_map::<S>(operation, params_seq)
    }

    fn execute_with_tag<T: Tag>(&self, operation: &str, params: &[Value]) -> Result<Mapped<Self, RawRow>> {
        self.cursor()?.execute_with_tag::<T>(operation, params)
    }
}

/// A connection delegating to a real driver.
///
/// The driver connection is closed on drop if `close()` was never called.
pub struct LiveConnection<D: DriverConnection> {
    driver: D,
    closed: bool,
}

impl<D: DriverConnection> LiveConnection<D> {
    pub fn new(driver: D) -> Self {
        Self { driver, closed: false }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed { resource: "connection" });
        }
        Ok(())
    }
}

impl<D: DriverConnection> Connection for LiveConnection<D> {
    type Cursor = LiveCursor<D::Cursor>;

    fn cursor(&self) -> Result<Self::Cursor> {
        self.ensure_open()?;
        Ok(Cursor::new(LiveBackend::new(self.driver.cursor()?)))
    }

    fn commit(&self) -> Result<()> {
        self.ensure_open()?;
        self.driver.commit()
    }

    fn rollback(&self) -> Result<()> {
        self.ensure_open()?;
        self.driver.rollback()
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        tracing::debug!(target: "typed_sql::driver", backend = self.driver.backend_name(), "closing connection");
        self.driver.close()
    }
}

impl<D: DriverConnection> Drop for LiveConnection<D> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(target: "typed_sql::driver", error = %e, "closing connection on drop failed");
        }
    }
}

/// Open the database named by `url` (see [`DatabaseConfig::from_url`]).
pub fn connect(url: &str) -> Result<LiveConnection<AnyConnection>> {
    Ok(LiveConnection::new(DatabaseConfig::from_url(url)?.connect()?))
}

/// Open the database named by the environment variables in `names`.
pub fn connect_from_env(names: &EnvNames) -> Result<LiveConnection<AnyConnection>> {
    let config = DatabaseConfig::from_env(names)?.ok_or_else(|| {
        Error::Config(format!(
            "neither {} nor {} is set",
            names.database_url, names.sqlite_path
        ))
    })?;
    Ok(LiveConnection::new(config.connect()?))
}
