//! PostgreSQL adapter built on the synchronous `postgres` client.
//!
//! A transaction is opened lazily before the first statement after a
//! commit or rollback, matching the usual client driver behaviour; nothing
//! is written until `commit` is called.

mod conversion;

use std::sync::{Arc, Mutex, PoisonError};

use postgres::types::ToSql;
use postgres::{Client, NoTls};

use super::{DriverConnection, DriverCursor, PostgresConfig, PostgresEnv, ResultBuffer};
use crate::error::{Error, Result};
use crate::value::{RawRow, Value};

pub use conversion::row_values;

struct Session {
    client: Client,
    in_transaction: bool,
}

type Shared = Arc<Mutex<Option<Session>>>;

fn with_session<T>(shared: &Shared, f: impl FnOnce(&mut Session) -> Result<T>) -> Result<T> {
    let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
    let session = guard.as_mut().ok_or(Error::Closed { resource: "connection" })?;
    f(session)
}

/// Connect with a URL (`postgres://...`) or a key/value connection string.
pub fn connect(connection_string: &str) -> Result<PostgresConnection> {
    let client = Client::connect(connection_string, NoTls).map_err(Error::driver)?;
    tracing::debug!(target: "typed_sql::driver", "opened postgres connection");
    Ok(PostgresConnection {
        session: Arc::new(Mutex::new(Some(Session {
            client,
            in_transaction: false,
        }))),
    })
}

/// Connect with settings read from the variables named in `env`.
pub fn connect_from_env(env: &PostgresEnv) -> Result<PostgresConnection> {
    connect(&PostgresConfig::from_env(env)?.build_connection_string()?)
}

pub struct PostgresConnection {
    session: Shared,
}

impl PostgresConnection {
    fn finish(&self, statement: &str) -> Result<()> {
        with_session(&self.session, |session| {
            if !session.in_transaction {
                return Ok(());
            }
            session.in_transaction = false;
            session.client.batch_execute(statement).map_err(Error::driver)
        })
    }
}

impl DriverConnection for PostgresConnection {
    type Cursor = PostgresCursor;

    fn cursor(&self) -> Result<PostgresCursor> {
        with_session(&self.session, |_| Ok(()))?;
        Ok(PostgresCursor {
            session: Arc::clone(&self.session),
            result: ResultBuffer::empty(),
            closed: false,
        })
    }

    fn commit(&self) -> Result<()> {
        self.finish("COMMIT")
    }

    fn rollback(&self) -> Result<()> {
        self.finish("ROLLBACK")
    }

    fn close(&mut self) -> Result<()> {
        let taken = self.session.lock().unwrap_or_else(PoisonError::into_inner).take();
        match taken {
            Some(session) => session.client.close().map_err(Error::driver),
            None => Ok(()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

pub struct PostgresCursor {
    session: Shared,
    result: ResultBuffer,
    closed: bool,
}

impl PostgresCursor {
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed { resource: "cursor" });
        }
        Ok(())
    }

    fn run(&self, operation: &str, params: &[Value]) -> Result<ResultBuffer> {
        with_session(&self.session, |session| run(session, operation, params))
    }
}

fn run(session: &mut Session, operation: &str, params: &[Value]) -> Result<ResultBuffer> {
    if !session.in_transaction {
        session.client.batch_execute("BEGIN").map_err(Error::driver)?;
        session.in_transaction = true;
    }

    let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
    let statement = session.client.prepare(operation).map_err(Error::driver)?;
    if statement.columns().is_empty() {
        let changed = session.client.execute(&statement, &refs).map_err(Error::driver)?;
        return Ok(ResultBuffer::affected(changed));
    }

    let columns = statement.columns().iter().map(|c| c.name().to_string()).collect();
    let rows = session.client.query(&statement, &refs).map_err(Error::driver)?;
    let rows = rows.iter().map(row_values).collect::<Result<Vec<RawRow>>>()?;
    Ok(ResultBuffer::rows(columns, rows))
}

impl DriverCursor for PostgresCursor {
    fn execute(&mut self, operation: &str, params: &[Value]) -> Result<()> {
        self.ensure_open()?;
        self.result = self.run(operation, params)?;
        Ok(())
    }

    fn executemany(&mut self, operation: &str, params_seq: &[Vec<Value>]) -> Result<()> {
        self.ensure_open()?;
        let mut total = ResultBuffer::empty();
        for params in params_seq {
            total.accumulate(self.run(operation, params)?);
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
