//! Backend delegating to a real driver cursor.

use crate::db::DriverCursor;
use crate::error::Result;
use crate::frame::Frame;
use crate::row::{map_row, RowType, RowTypeId};
use crate::value::Value;

use super::CursorBackend;

/// Wraps a driver cursor, mapping fetched rows through the row mapper.
///
/// The driver cursor is closed on drop if `close()` was never called.
pub struct LiveBackend<D: DriverCursor> {
    driver: D,
    closed: bool,
}

impl<D: DriverCursor> LiveBackend<D> {
    pub fn new(driver: D) -> Self {
        Self { driver, closed: false }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}

impl<D: DriverCursor> CursorBackend for LiveBackend<D> {
    fn execute<S: RowType>(&mut self, _expected: Option<RowTypeId>, operation: &str, params: &[Value]) -> Result<()> {
        self.driver.execute(operation, params)
    }

    fn executemany<S: RowType>(
        &mut self,
        _expected: Option<RowTypeId>,
        operation: &str,
        params_seq: &[Vec<Value>],
    ) -> Result<()> {
        self.driver.executemany(operation, params_seq)
    }

    fn next_row<R: RowType>(&mut self, _strict: bool) -> Result<Option<R>> {
        self.driver.fetchone()?.map(map_row::<R>).transpose()
    }

    fn next_batch<R: RowType>(&mut self, limit: Option<usize>) -> Result<Vec<R>> {
        let raw = match limit {
            Some(size) => self.driver.fetchmany(size)?,
            None => self.driver.fetchall()?,
        };
        raw.into_iter().map(map_row::<R>).collect()
    }

    fn rowcount(&self) -> i64 {
        self.driver.rowcount()
    }

    fn description(&self) -> Option<Vec<String>> {
        self.driver.description()
    }

    fn scope_session(&mut self, statement: &str) -> Result<()> {
        self.driver.execute(statement, &[])
    }

    fn fetch_frame(&mut self) -> Result<Frame> {
        let columns = self.driver.description().unwrap_or_default();
        let rows = self.driver.fetchall()?;
        Ok(Frame::new(columns, rows))
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.driver.close()
    }
}

impl<D: DriverCursor> Drop for LiveBackend<D> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(target: "typed_sql::cursor", error = %e, "closing driver cursor on drop failed");
        }
    }
}
