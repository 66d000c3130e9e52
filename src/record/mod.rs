//! Recording fetched rows to CSV.
//!
//! [`record_to_csv`] wraps any cursor in a [`RecordingCursor`] that
//! forwards every call to the wrapped cursor and appends each row returned
//! by a fetch to a CSV file. The file can later be replayed into a mock
//! connection with
//! [`MockConnection::inject_response_from_csv`](crate::mock::MockConnection::inject_response_from_csv).

mod csv_io;

use std::path::Path;

use crate::cursor::{ExecuteCursor, FrameFetch, RowCursor, SessionScope, SessionScoping};
use crate::error::Result;
use crate::frame::Frame;
use crate::mock::Tag;
use crate::row::RowType;
use crate::value::{RawRow, Value};

pub use csv_io::{read_csv, CsvData, CsvRecorder};

/// Whether recording is on, as a flag or as free-form text.
///
/// Text resolves to `false` only for `"false"` (any case); every other
/// string enables recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordEnable {
    Flag(bool),
    Text(String),
}

impl RecordEnable {
    pub fn resolve(&self) -> bool {
        match self {
            RecordEnable::Flag(enabled) => *enabled,
            RecordEnable::Text(text) => !text.trim().eq_ignore_ascii_case("false"),
        }
    }

    /// Read the setting from environment variable `var`; unset means enabled.
    pub fn from_env(var: &str) -> Self {
        match std::env::var(var) {
            Ok(text) => RecordEnable::Text(text),
            Err(_) => RecordEnable::default(),
        }
    }
}

impl Default for RecordEnable {
    fn default() -> Self {
        RecordEnable::Flag(true)
    }
}

impl From<bool> for RecordEnable {
    fn from(enabled: bool) -> Self {
        RecordEnable::Flag(enabled)
    }
}

impl From<&str> for RecordEnable {
    fn from(text: &str) -> Self {
        RecordEnable::Text(text.to_string())
    }
}

impl From<String> for RecordEnable {
    fn from(text: String) -> Self {
        RecordEnable::Text(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOptions {
    pub enable: RecordEnable,
    /// Maximum number of data rows written. Fetching is unaffected.
    pub limit: Option<usize>,
    /// Emit a header line of field names before the first row.
    pub header: bool,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            enable: RecordEnable::default(),
            limit: None,
            header: true,
        }
    }
}

/// Wrap `cursor` so the rows it fetches are appended to the CSV file at
/// `path`.
///
/// When recording resolves to disabled the file is not touched and every
/// call is forwarded unchanged. The wrapper type stays the same either way;
/// methods only the wrapped cursor has are reached through
/// [`RecordingCursor::inner`] or [`RecordingCursor::into_inner`].
///
/// With a header enabled, fetches over raw or tuple rows fail with
/// `RowTypeNotSupported` before reading from the wrapped cursor, unless
/// [`RecordingCursor::with_columns`] named the columns.
pub fn record_to_csv<C: RowCursor>(
    path: impl AsRef<Path>,
    cursor: C,
    options: RecordOptions,
) -> Result<RecordingCursor<C>> {
    if !options.enable.resolve() {
        tracing::debug!(target: "typed_sql::record", path = %path.as_ref().display(), "recording disabled");
        return Ok(RecordingCursor {
            inner: cursor,
            recorder: None,
        });
    }
    let recorder = CsvRecorder::create(path, options.header, options.limit)?;
    Ok(RecordingCursor {
        inner: cursor,
        recorder: Some(recorder),
    })
}

/// Cursor decorator that records fetched rows.
pub struct RecordingCursor<C> {
    inner: C,
    recorder: Option<CsvRecorder>,
}

impl<C> RecordingCursor<C> {
    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn recorder(&self) -> Option<&CsvRecorder> {
        self.recorder.as_ref()
    }

    /// Name the header columns for row types without field names, usually
    /// from the executed cursor's description.
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.set_columns(columns);
        }
        self
    }

    /// Give back the wrapped cursor. The recorder is dropped, which flushes
    /// and closes the file.
    pub fn into_inner(self) -> C {
        self.inner
    }

    fn rewrap<D>(recorder: Option<CsvRecorder>, inner: D) -> RecordingCursor<D> {
        RecordingCursor { inner, recorder }
    }

    fn check_header<R: RowType>(&self) -> Result<()> {
        match self.recorder.as_ref() {
            Some(recorder) => recorder.check_header::<R>(),
            None => Ok(()),
        }
    }

    fn record_one<R: RowType>(&mut self, row: &Option<R>) -> Result<()> {
        if let (Some(recorder), Some(row)) = (self.recorder.as_mut(), row) {
            recorder.record(row)?;
        }
        Ok(())
    }

    fn record_many<R: RowType>(&mut self, rows: &[R]) -> Result<()> {
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record_all(rows)?;
        }
        Ok(())
    }
}

impl<C: RowCursor> RowCursor for RecordingCursor<C> {
    type Row = C::Row;

    fn fetchone(&mut self) -> Result<Option<C::Row>> {
        self.check_header::<C::Row>()?;
        let row = self.inner.fetchone()?;
        self.record_one(&row)?;
        Ok(row)
    }

    fn fetchmany(&mut self, size: Option<usize>) -> Result<Vec<C::Row>> {
        self.check_header::<C::Row>()?;
        let rows = self.inner.fetchmany(size)?;
        self.record_many(&rows)?;
        Ok(rows)
    }

    fn fetchall(&mut self) -> Result<Vec<C::Row>> {
        self.check_header::<C::Row>()?;
        let rows = self.inner.fetchall()?;
        self.record_many(&rows)?;
        Ok(rows)
    }

    fn next_row(&mut self) -> Result<Option<C::Row>> {
        self.check_header::<C::Row>()?;
        let row = self.inner.next_row()?;
        self.record_one(&row)?;
        Ok(row)
    }

    fn rowcount(&self) -> i64 {
        self.inner.rowcount()
    }

    fn arraysize(&self) -> usize {
        self.inner.arraysize()
    }

    fn set_arraysize(&mut self, size: usize) {
        self.inner.set_arraysize(size);
    }

    fn description(&self) -> Option<Vec<String>> {
        self.inner.description()
    }

    fn close(&mut self) -> Result<()> {
        let closed = self.inner.close();
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.close()?;
        }
        closed
    }
}

impl<C: ExecuteCursor> ExecuteCursor for RecordingCursor<C> {
    type Mapped<S: RowType> = RecordingCursor<C::Mapped<S>>;

    fn execute_map<S: RowType>(self, operation: &str, params: &[Value]) -> Result<Self::Mapped<S>> {
        let inner = self.inner.execute_map::<S>(operation, params)?;
        Ok(Self::rewrap(self.recorder, inner))
    }

    fn executemany_map<S: RowType>(self, operation: &str, params_seq: &[Vec<Value>]) -> Result<Self::Mapped<S>> {
        let inner = self.inner.executemany_map::<S>(operation, params_seq)?;
        Ok(Self::rewrap(self.recorder, inner))
    }

    fn execute_with_tag<T: Tag>(self, operation: &str, params: &[Value]) -> Result<Self::Mapped<RawRow>> {
        let inner = self.inner.execute_with_tag::<T>(operation, params)?;
        Ok(Self::rewrap(self.recorder, inner))
    }
}

impl<C: SessionScoping> SessionScoping for RecordingCursor<C> {
    fn use_scope(&mut self, scope: SessionScope, name: &str) -> Result<&mut Self> {
        self.inner.use_scope(scope, name)?;
        Ok(self)
    }
}

impl<C: FrameFetch> FrameFetch for RecordingCursor<C> {
    fn fetch_frame(&mut self) -> Result<Frame> {
        self.inner.fetch_frame()
    }
}
