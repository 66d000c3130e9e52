use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::row::{map_row, RowType, RowTypeId};
use crate::value::Value;

use super::{AsyncConnection, AsyncCursor, AsyncCursorBackend, AsyncDriverConnection, AsyncDriverCursor};

/// Wraps an async driver cursor, mapping fetched rows through the row mapper.
pub struct AsyncLiveBackend<D: AsyncDriverCursor> {
    driver: D,
    closed: bool,
}

impl<D: AsyncDriverCursor> AsyncLiveBackend<D> {
    pub fn new(driver: D) -> Self {
        Self { driver, closed: false }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}

#[async_trait]
impl<D: AsyncDriverCursor> AsyncCursorBackend for AsyncLiveBackend<D> {
    async fn execute<S: RowType>(
        &mut self,
        _expected: Option<RowTypeId>,
        operation: &str,
        params: &[Value],
    ) -> Result<()> {
        self.driver.execute(operation, params).await
    }

    async fn executemany<S: RowType>(
        &mut self,
        _expected: Option<RowTypeId>,
        operation: &str,
        params_seq: &[Vec<Value>],
    ) -> Result<()> {
        self.driver.executemany(operation, params_seq).await
    }

    async fn next_row<R: RowType>(&mut self, _strict: bool) -> Result<Option<R>> {
        self.driver.fetchone().await?.map(map_row::<R>).transpose()
    }

    async fn next_batch<R: RowType>(&mut self, limit: Option<usize>) -> Result<Vec<R>> {
        let raw = match limit {
            Some(size) => self.driver.fetchmany(size).await?,
            None => self.driver.fetchall().await?,
        };
        raw.into_iter().map(map_row::<R>).collect()
    }

    fn rowcount(&self) -> i64 {
        self.driver.rowcount()
    }

    fn description(&self) -> Option<Vec<String>> {
        self.driver.description()
    }

    async fn scope_session(&mut self, statement: &str) -> Result<()> {
        self.driver.execute(statement, &[]).await
    }

    async fn fetch_frame(&mut self) -> Result<Frame> {
        let columns = self.driver.description().unwrap_or_default();
        let rows = self.driver.fetchall().await?;
        Ok(Frame::new(columns, rows))
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.driver.close().await
    }
}

impl<D: AsyncDriverCursor> Drop for AsyncLiveBackend<D> {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!(target: "typed_sql::driver", "async cursor dropped without close()");
        }
    }
}

/// An async connection delegating to a real driver.
pub struct AsyncLiveConnection<D: AsyncDriverConnection> {
    driver: D,
    closed: bool,
}

impl<D: AsyncDriverConnection> AsyncLiveConnection<D> {
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

#[async_trait]
impl<D: AsyncDriverConnection> AsyncConnection for AsyncLiveConnection<D> {
    type Backend = AsyncLiveBackend<D::Cursor>;

    async fn cursor(&self) -> Result<AsyncCursor<Self::Backend>> {
        self.ensure_open()?;
        Ok(AsyncCursor::new(AsyncLiveBackend::new(self.driver.cursor().await?)))
    }

    async fn commit(&self) -> Result<()> {
        self.ensure_open()?;
        self.driver.commit().await
    }

    async fn rollback(&self) -> Result<()> {
        self.ensure_open()?;
        self.driver.rollback().await
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.driver.close().await
    }
}

impl<D: AsyncDriverConnection> Drop for AsyncLiveConnection<D> {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!(target: "typed_sql::driver", "async connection dropped without close()");
        }
    }
}
