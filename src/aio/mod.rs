//! Async mirror of the cursor and connection contracts.
//!
//! [`AsyncCursor`] has the same states, fetch semantics and error behaviour
//! as [`Cursor`](crate::cursor::Cursor), with awaited methods. It runs over
//! an [`AsyncCursorBackend`]: either an [`AsyncLiveBackend`] wrapping an
//! [`AsyncDriverCursor`], or the same [`MockBackend`] the blocking family
//! uses, so one [`MockConnection`] serves both families.
//!
//! Async driver cursors cannot be closed from `Drop`; call `close()`.

mod live;
mod poll;

use std::marker::PhantomData;

use async_trait::async_trait;

use crate::cursor::{scope_statement, CursorBackend, MockBackend, SessionScope, DEFAULT_ARRAYSIZE};
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::mock::{MockConnection, Tag};
use crate::row::{RowType, RowTypeId};
use crate::value::{RawRow, Value};

pub use live::{AsyncLiveBackend, AsyncLiveConnection};
pub use poll::{wait_for_completion, QueryStatus};

/// Raw cursor of an async driver.
#[async_trait]
pub trait AsyncDriverCursor: Send {
    async fn execute(&mut self, operation: &str, params: &[Value]) -> Result<()>;

    async fn executemany(&mut self, operation: &str, params_seq: &[Vec<Value>]) -> Result<()> {
        for params in params_seq {
            self.execute(operation, params).await?;
        }
        Ok(())
    }

    async fn fetchone(&mut self) -> Result<Option<RawRow>>;

    async fn fetchmany(&mut self, size: usize) -> Result<Vec<RawRow>> {
        let mut rows = Vec::with_capacity(size);
        while rows.len() < size {
            match self.fetchone().await? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }

    async fn fetchall(&mut self) -> Result<Vec<RawRow>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetchone().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    fn rowcount(&self) -> i64;

    fn description(&self) -> Option<Vec<String>>;

    async fn close(&mut self) -> Result<()>;
}

/// Raw connection of an async driver.
#[async_trait]
pub trait AsyncDriverConnection: Send + Sync {
    type Cursor: AsyncDriverCursor;

    async fn cursor(&self) -> Result<Self::Cursor>;

    async fn commit(&self) -> Result<()>;

    async fn rollback(&self) -> Result<()>;

    async fn close(&mut self) -> Result<()>;
}

/// What an [`AsyncCursor`] delegates to. Mirrors
/// [`CursorBackend`](crate::cursor::CursorBackend).
#[async_trait]
pub trait AsyncCursorBackend: Send {
    async fn execute<S: RowType>(&mut self, expected: Option<RowTypeId>, operation: &str, params: &[Value])
        -> Result<()>;

    async fn executemany<S: RowType>(
        &mut self,
        expected: Option<RowTypeId>,
        operation: &str,
        params_seq: &[Vec<Value>],
    ) -> Result<()>;

    async fn next_row<R: RowType>(&mut self, strict: bool) -> Result<Option<R>>;

    async fn next_batch<R: RowType>(&mut self, limit: Option<usize>) -> Result<Vec<R>>;

    fn rowcount(&self) -> i64;

    fn description(&self) -> Option<Vec<String>>;

    async fn scope_session(&mut self, statement: &str) -> Result<()>;

    async fn fetch_frame(&mut self) -> Result<Frame>;

    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
impl AsyncCursorBackend for MockBackend {
    async fn execute<S: RowType>(
        &mut self,
        expected: Option<RowTypeId>,
        operation: &str,
        params: &[Value],
    ) -> Result<()> {
        CursorBackend::execute::<S>(self, expected, operation, params)
    }

    async fn executemany<S: RowType>(
        &mut self,
        expected: Option<RowTypeId>,
        operation: &str,
        params_seq: &[Vec<Value>],
    ) -> Result<()> {
        CursorBackend::executemany::<S>(self, expected, operation, params_seq)
    }

    async fn next_row<R: RowType>(&mut self, strict: bool) -> Result<Option<R>> {
        CursorBackend::next_row(self, strict)
    }

    async fn next_batch<R: RowType>(&mut self, limit: Option<usize>) -> Result<Vec<R>> {
        CursorBackend::next_batch(self, limit)
    }

    fn rowcount(&self) -> i64 {
        CursorBackend::rowcount(self)
    }

    fn description(&self) -> Option<Vec<String>> {
        CursorBackend::description(self)
    }

    async fn scope_session(&mut self, statement: &str) -> Result<()> {
        CursorBackend::scope_session(self, statement)
    }

    async fn fetch_frame(&mut self) -> Result<Frame> {
        CursorBackend::fetch_frame(self)
    }

    async fn close(&mut self) -> Result<()> {
        CursorBackend::close(self)
    }
}

/// An async cursor yielding rows of type `R` from backend `B`.
pub struct AsyncCursor<B, R = RawRow> {
    backend: B,
    arraysize: usize,
    closed: bool,
    _row: PhantomData<fn() -> R>,
}

impl<B: AsyncCursorBackend> AsyncCursor<B, RawRow> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            arraysize: DEFAULT_ARRAYSIZE,
            closed: false,
            _row: PhantomData,
        }
    }
}

impl<B: AsyncCursorBackend, R: RowType> AsyncCursor<B, R> {
    pub fn row_type(&self) -> Option<RowTypeId> {
        R::descriptor()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed { resource: "cursor" });
        }
        Ok(())
    }

    fn retype<S: RowType>(self) -> AsyncCursor<B, S> {
        AsyncCursor {
            backend: self.backend,
            arraysize: self.arraysize,
            closed: self.closed,
            _row: PhantomData,
        }
    }

    pub async fn execute_map<S: RowType>(mut self, operation: &str, params: &[Value]) -> Result<AsyncCursor<B, S>> {
        self.ensure_open()?;
        tracing::debug!(target: "typed_sql::cursor", operation, row_type = std::any::type_name::<S>(), "execute (async)");
        self.backend.execute::<S>(S::descriptor(), operation, params).await?;
        Ok(self.retype())
    }

    pub async fn executemany_map<S: RowType>(
        mut self,
        operation: &str,
        params_seq: &[Vec<Value>],
    ) -> Result<AsyncCursor<B, S>> {
        self.ensure_open()?;
        self.backend.executemany::<S>(S::descriptor(), operation, params_seq).await?;
        Ok(self.retype())
    }

    pub async fn execute(self, operation: &str, params: &[Value]) -> Result<AsyncCursor<B, RawRow>> {
        self.execute_map::<RawRow>(operation, params).await
    }

    pub async fn executemany(self, operation: &str, params_seq: &[Vec<Value>]) -> Result<AsyncCursor<B, RawRow>> {
        self.executemany_map::<RawRow>(operation, params_seq).await
    }

    pub async fn execute_with_tag<T: Tag>(mut self, operation: &str, params: &[Value]) -> Result<AsyncCursor<B, RawRow>> {
        self.ensure_open()?;
        tracing::debug!(
            target: "typed_sql::cursor",
            operation,
            kind = %T::KIND,
            target_type = std::any::type_name::<T::Target>(),
            "execute with tag (async)"
        );
        self.backend.execute::<RawRow>(Some(T::descriptor()), operation, params).await?;
        Ok(self.retype())
    }

    pub async fn fetchone(&mut self) -> Result<Option<R>> {
        self.ensure_open()?;
        self.backend.next_row(false).await
    }

    pub async fn fetchmany(&mut self, size: Option<usize>) -> Result<Vec<R>> {
        self.ensure_open()?;
        self.backend.next_batch(Some(size.unwrap_or(self.arraysize))).await
    }

    pub async fn fetchall(&mut self) -> Result<Vec<R>> {
        self.ensure_open()?;
        self.backend.next_batch(None).await
    }

    /// Iteration primitive; an unbound mock cursor fails here.
    pub async fn next_row(&mut self) -> Result<Option<R>> {
        self.ensure_open()?;
        self.backend.next_row(true).await
    }

    pub fn rowcount(&self) -> i64 {
        self.backend.rowcount()
    }

    pub fn arraysize(&self) -> usize {
        self.arraysize
    }

    pub fn set_arraysize(&mut self, size: usize) {
        self.arraysize = size;
    }

    pub fn description(&self) -> Option<Vec<String>> {
        self.backend.description()
    }

    pub async fn use_scope(&mut self, scope: SessionScope, name: &str) -> Result<&mut Self> {
        self.ensure_open()?;
        let statement = scope_statement(scope, name)?;
        self.backend.scope_session(&statement).await?;
        Ok(self)
    }

    pub async fn use_warehouse(&mut self, name: &str) -> Result<&mut Self> {
        self.use_scope(SessionScope::Warehouse, name).await
    }

    pub async fn use_database(&mut self, name: &str) -> Result<&mut Self> {
        self.use_scope(SessionScope::Database, name).await
    }

    pub async fn use_schema(&mut self, name: &str) -> Result<&mut Self> {
        self.use_scope(SessionScope::Schema, name).await
    }

    pub async fn use_role(&mut self, name: &str) -> Result<&mut Self> {
        self.use_scope(SessionScope::Role, name).await
    }

    pub async fn fetch_frame(&mut self) -> Result<Frame> {
        self.ensure_open()?;
        self.backend.fetch_frame().await
    }

    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.backend.close().await
    }
}

/// Async connection contract, with the same one-cursor-per-call shortcuts
/// as [`Connection`](crate::connection::Connection).
#[async_trait]
pub trait AsyncConnection: Send + Sync {
    type Backend: AsyncCursorBackend;

    async fn cursor(&self) -> Result<AsyncCursor<Self::Backend>>;

    async fn commit(&self) -> Result<()>;

    async fn rollback(&self) -> Result<()>;

    async fn close(&mut self) -> Result<()>;

    async fn execute(&self, operation: &str, params: &[Value]) -> Result<AsyncCursor<Self::Backend>> {
        self.cursor().await?.execute(operation, params).await
    }

    async fn executemany(&self, operation: &str, params_seq: &[Vec<Value>]) -> Result<AsyncCursor<Self::Backend>> {
        self.cursor().await?.executemany(operation, params_seq).await
    }

    async fn execute_map<S: RowType>(&self, operation: &str, params: &[Value]) -> Result<AsyncCursor<Self::Backend, S>> {
        self.cursor().await?.execute_map::<S>(operation, params).await
    }

    async fn executemany_map<S: RowType>(
        &self,
        operation: &str,
        params_seq: &[Vec<Value>],
    ) -> Result<AsyncCursor<Self::Backend, S>> {
        self.cursor().await?.executemany_map::<S>(operation, params_seq).await
    }

    async fn execute_with_tag<T: Tag>(&self, operation: &str, params: &[Value]) -> Result<AsyncCursor<Self::Backend>> {
        self.cursor().await?.execute_with_tag::<T>(operation, params).await
    }
}

#[async_trait]
impl AsyncConnection for MockConnection {
    type Backend = MockBackend;

    async fn cursor(&self) -> Result<AsyncCursor<MockBackend>> {
        if self.is_closed() {
            return Err(Error::Closed { resource: "connection" });
        }
        Ok(AsyncCursor::new(MockBackend::new(self.store())))
    }

    async fn commit(&self) -> Result<()> {
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        crate::connection::Connection::close(self)
    }
}
