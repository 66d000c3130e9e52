//! Driver capability traits and the concrete driver adapters.
//!
//! The typed layer never talks to a database itself. Everything it needs
//! from a driver is captured by two traits:
//! - [`DriverConnection`]: cursor creation plus commit/rollback/close
//! - [`DriverCursor`]: execute, positional fetches, rowcount, description
//!
//! Rows cross this boundary as [`RawRow`]s; mapping into row types happens
//! above it, in the cursor layer.
//!
//! # Adapters
//!
//! - `sqlite` (default feature): embedded SQLite through `rusqlite`
//! - `postgres`: PostgreSQL through the synchronous `postgres` client
//!
//! Both adapters buffer the whole result of a query on execute, so fetches
//! never hold a borrow of the underlying connection.

mod buffer;
mod config;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use crate::error::Result;
use crate::value::{RawRow, Value};

pub use buffer::ResultBuffer;
pub use config::{
    AnyConnection, AnyCursor, DatabaseConfig, EnvNames, PostgresConfig, PostgresEnv, DATABASE_URL_VAR,
    DEFAULT_DATABASE_PATH, SQLITE_PATH_VAR,
};

/// Raw cursor of an underlying driver.
pub trait DriverCursor: Send {
    fn execute(&mut self, operation: &str, params: &[Value]) -> Result<()>;

    /// Run `operation` once per parameter set. Drivers that batch natively
    /// override this.
    fn executemany(&mut self, operation: &str, params_seq: &[Vec<Value>]) -> Result<()> {
        for params in params_seq {
            self.execute(operation, params)?;
        }
        Ok(())
    }

    fn fetchone(&mut self) -> Result<Option<RawRow>>;

    fn fetchmany(&mut self, size: usize) -> Result<Vec<RawRow>> {
        let mut rows = Vec::with_capacity(size);
        while rows.len() < size {
            match self.fetchone()? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }

    fn fetchall(&mut self) -> Result<Vec<RawRow>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetchone()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Rows affected or produced by the last execute, `-1` when unknown.
    fn rowcount(&self) -> i64;

    /// Column names of the current result, `None` for statements without one.
    fn description(&self) -> Option<Vec<String>>;

    fn close(&mut self) -> Result<()>;
}

/// Raw connection of an underlying driver.
pub trait DriverConnection: Send {
    type Cursor: DriverCursor;

    fn cursor(&self) -> Result<Self::Cursor>;

    fn commit(&self) -> Result<()>;

    fn rollback(&self) -> Result<()>;

    fn close(&mut self) -> Result<()>;

    /// Get the backend name for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
