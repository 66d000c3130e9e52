//! Cursor contracts and the generic cursor.
//!
//! The fetch side ([`RowCursor`]) and the execute side ([`ExecuteCursor`])
//! are separate traits so decorators can forward each explicitly. The
//! concrete [`Cursor`] is generic over a [`CursorBackend`], which is either
//! a live driver cursor ([`LiveBackend`]) or a mock store
//! ([`MockBackend`]), and over the row type `R` it yields.
//!
//! Executing consumes the cursor and hands it back re-typed: `execute`
//! yields a `Cursor<B, RawRow>`, `execute_map::<S>` a `Cursor<B, S>`.

mod live;
mod mock;
mod session;

use std::marker::PhantomData;

use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::mock::Tag;
use crate::row::{RowType, RowTypeId};
use crate::value::{RawRow, Value};

pub use live::LiveBackend;
pub use mock::MockBackend;
pub use session::{scope_statement, SessionScope};

/// Default number of rows returned by `fetchmany(None)`.
pub const DEFAULT_ARRAYSIZE: usize = 1;

/// Fetch side of a cursor.
pub trait RowCursor {
    type Row: RowType;

    /// Next row, or `None` at the end of the result.
    fn fetchone(&mut self) -> Result<Option<Self::Row>>;

    /// Up to `size` rows (default: [`arraysize`](Self::arraysize)); fewer at
    /// the end of the result.
    fn fetchmany(&mut self, size: Option<usize>) -> Result<Vec<Self::Row>>;

    /// Every remaining row.
    fn fetchall(&mut self) -> Result<Vec<Self::Row>>;

    /// Iteration primitive behind [`rows`](Self::rows). Unlike `fetchone`,
    /// an unbound mock cursor fails here.
    fn next_row(&mut self) -> Result<Option<Self::Row>>;

    /// Rows affected or produced, `-1` when unknown.
    fn rowcount(&self) -> i64;

    fn arraysize(&self) -> usize;

    fn set_arraysize(&mut self, size: usize);

    /// Column names of the current result, when known.
    fn description(&self) -> Option<Vec<String>>;

    /// Release the cursor. Idempotent.
    fn close(&mut self) -> Result<()>;

    fn rows(&mut self) -> Rows<'_, Self>
    where
        Self: Sized,
    {
        Rows {
            cursor: self,
            done: false,
        }
    }
}

/// Iterator over the remaining rows of a cursor.
///
/// Yields the first error and then stops; after exhaustion it keeps
/// returning `None`.
pub struct Rows<'c, C> {
    cursor: &'c mut C,
    done: bool,
}

impl<C: RowCursor> Iterator for Rows<'_, C> {
    type Item = Result<C::Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Execute side of a cursor.
///
/// Each method consumes the cursor and returns it bound to the new result
/// with the new row type.
pub trait ExecuteCursor: RowCursor + Sized {
    type Mapped<S: RowType>: ExecuteCursor<Row = S>;

    fn execute_map<S: RowType>(self, operation: &str, params: &[Value]) -> Result<Self::Mapped<S>>;

    fn executemany_map<S: RowType>(
        self,
        operation: &str,
        params_seq: &[Vec<Value>],
    ) -> Result<Self::Mapped<S>>;

    /// Like [`execute`](Self::execute), but a mock backend checks the queued
    /// entry against the tag instead of against raw rows.
    fn execute_with_tag<T: Tag>(self, operation: &str, params: &[Value]) -> Result<Self::Mapped<RawRow>>;

    fn execute(self, operation: &str, params: &[Value]) -> Result<Self::Mapped<RawRow>> {
        self.execute_map::<RawRow>(operation, params)
    }

    fn executemany(self, operation: &str, params_seq: &[Vec<Value>]) -> Result<Self::Mapped<RawRow>> {
        self.executemany_map::<RawRow>(operation, params_seq)
    }
}

/// Warehouse/database/schema/role switching.
pub trait SessionScoping {
    fn use_scope(&mut self, scope: SessionScope, name: &str) -> Result<&mut Self>;

    fn use_warehouse(&mut self, name: &str) -> Result<&mut Self> {
        self.use_scope(SessionScope::Warehouse, name)
    }

    fn use_database(&mut self, name: &str) -> Result<&mut Self> {
        self.use_scope(SessionScope::Database, name)
    }

    fn use_schema(&mut self, name: &str) -> Result<&mut Self> {
        self.use_scope(SessionScope::Schema, name)
    }

    fn use_role(&mut self, name: &str) -> Result<&mut Self> {
        self.use_scope(SessionScope::Role, name)
    }
}

/// Whole-result fetches.
pub trait FrameFetch {
    /// Column names plus every remaining row.
    fn fetch_frame(&mut self) -> Result<Frame>;

    /// The same result split into frames of at most `batch` rows.
    fn fetch_frame_batches(&mut self, batch: usize) -> Result<Vec<Frame>> {
        Ok(self.fetch_frame()?.into_batches(batch))
    }
}

/// What a [`Cursor`] delegates to.
///
/// `expected` is the descriptor a mock backend checks the queued entry
/// against; live backends ignore it.
pub trait CursorBackend: Send {
    fn execute<S: RowType>(&mut self, expected: Option<RowTypeId>, operation: &str, params: &[Value]) -> Result<()>;

    fn executemany<S: RowType>(
        &mut self,
        expected: Option<RowTypeId>,
        operation: &str,
        params_seq: &[Vec<Value>],
    ) -> Result<()>;

    /// Next row. `strict` asks an unbound backend to fail instead of
    /// reporting the end of the result.
    fn next_row<R: RowType>(&mut self, strict: bool) -> Result<Option<R>>;

    /// Up to `limit` rows, or all remaining rows when `limit` is `None`.
    fn next_batch<R: RowType>(&mut self, limit: Option<usize>) -> Result<Vec<R>>;

    fn rowcount(&self) -> i64;

    fn description(&self) -> Option<Vec<String>>;

    /// Run a session-scoping statement that produces no result.
    fn scope_session(&mut self, statement: &str) -> Result<()>;

    fn fetch_frame(&mut self) -> Result<Frame>;

    fn close(&mut self) -> Result<()>;
}

/// A cursor yielding rows of type `R` from backend `B`.
pub struct Cursor<B, R = RawRow> {
    backend: B,
    arraysize: usize,
    closed: bool,
    _row: PhantomData<fn() -> R>,
}

/// Cursor over a live driver cursor.
pub type LiveCursor<D, R = RawRow> = Cursor<LiveBackend<D>, R>;

/// Cursor over a mock store.
pub type MockCursor<R = RawRow> = Cursor<MockBackend, R>;

impl<B: CursorBackend> Cursor<B, RawRow> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            arraysize: DEFAULT_ARRAYSIZE,
            closed: false,
            _row: PhantomData,
        }
    }
}

impl<B: CursorBackend, R: RowType> Cursor<B, R> {
    /// Descriptor of the current row type, `None` for raw rows.
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

    fn retype<S: RowType>(self) -> Cursor<B, S> {
        Cursor {
            backend: self.backend,
            arraysize: self.arraysize,
            closed: self.closed,
            _row: PhantomData,
        }
    }
}

impl<B: CursorBackend, R: RowType> RowCursor for Cursor<B, R> {
    type Row = R;

    fn fetchone(&mut self) -> Result<Option<R>> {
        self.ensure_open()?;
        self.backend.next_row(false)
    }

    fn fetchmany(&mut self, size: Option<usize>) -> Result<Vec<R>> {
        self.ensure_open()?;
        self.backend.next_batch(Some(size.unwrap_or(self.arraysize)))
    }

    fn fetchall(&mut self) -> Result<Vec<R>> {
        self.ensure_open()?;
        self.backend.next_batch(None)
    }

    fn next_row(&mut self) -> Result<Option<R>> {
        self.ensure_open()?;
        self.backend.next_row(true)
    }

    fn rowcount(&self) -> i64 {
        self.backend.rowcount()
    }

    fn arraysize(&self) -> usize {
        self.arraysize
    }

    fn set_arraysize(&mut self, size: usize) {
        self.arraysize = size;
    }

    fn description(&self) -> Option<Vec<String>> {
        self.backend.description()
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.backend.close()
    }
}

impl<B: CursorBackend, R: RowType> ExecuteCursor for Cursor<B, R> {
    type Mapped<S: RowType> = Cursor<B, S>;

    fn execute_map<S: RowType>(mut self, operation: &str, params: &[Value]) -> Result<Self::Mapped<S>> {
        self.ensure_open()?;
        tracing::debug!(target: "typed_sql::cursor", operation, row_type = std::any::type_name::<S>(), "execute");
        self.backend.execute::<S>(S::descriptor(), operation, params)?;
        Ok(self.retype())
    }

    fn executemany_map<S: RowType>(mut self, operation: &str, params_seq: &[Vec<Value>]) -> Result<Self::Mapped<S>> {
        self.ensure_open()?;
        tracing::debug!(
            target: "typed_sql::cursor",
            operation,
            batches = params_seq.len(),
            row_type = std::any::type_name::<S>(),
            "executemany"
        );
        self.backend.executemany::<S>(S::descriptor(), operation, params_seq)?;
        Ok(self.retype())
    }

    fn execute_with_tag<T: Tag>(mut self, operation: &str, params: &[Value]) -> Result<Self::Mapped<RawRow>> {
        self.ensure_open()?;
        tracing::debug!(
            target: "typed_sql::cursor",
            operation,
            kind = %T::KIND,
            target_type = std::any::type_name::<T::Target>(),
            "execute with tag"
        );
        self.backend.execute::<RawRow>(Some(T::descriptor()), operation, params)?;
        Ok(self.retype())
    }
}

impl<B: CursorBackend, R: RowType> SessionScoping for Cursor<B, R> {
    fn use_scope(&mut self, scope: SessionScope, name: &str) -> Result<&mut Self> {
        self.ensure_open()?;
        let statement = scope_statement(scope, name)?;
        self.backend.scope_session(&statement)?;
        Ok(self)
    }
}

impl<B: CursorBackend, R: RowType> FrameFetch for Cursor<B, R> {
    fn fetch_frame(&mut self) -> Result<Frame> {
        self.ensure_open()?;
        self.backend.fetch_frame()
    }
}
