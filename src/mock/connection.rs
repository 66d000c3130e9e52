//! Mock connection backed by a FIFO store.

use std::path::Path;
use std::sync::{Arc, Mutex};

use super::store::{lock, MockResponse, MockStore, Payload, SharedStore};
use super::Tag;
use crate::connection::Connection;
use crate::cursor::{Cursor, MockBackend, MockCursor};
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::record::read_csv;
use crate::row::{map_row, RowType};
use crate::value::RawRow;

/// A connection that answers from canned responses instead of a database.
///
/// Responses are served in injection order to whichever cursor executes
/// next; every cursor of the connection shares the same store.
///
/// ```
/// use typed_sql::prelude::*;
///
/// #[derive(Debug, Clone, PartialEq)]
/// pub struct User {
///     pub id: i64,
///     pub name: String,
/// }
/// typed_sql::row_record!(User { id, name });
///
/// let conn = MockConnection::new();
/// conn.inject_response(vec![User { id: 1, name: "ada".into() }]);
///
/// let mut cur = conn.execute_map::<User>("SELECT id, name FROM users", &[]).unwrap();
/// assert_eq!(cur.fetchone().unwrap().map(|u| u.id), Some(1));
/// ```
pub struct MockConnection {
    store: SharedStore,
    closed: bool,
}

impl Default for MockConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(MockStore::new())),
            closed: false,
        }
    }

    /// Handle to the shared store.
    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }

    pub fn inject<R: RowType>(&self, response: MockResponse<R>) {
        lock(&self.store).inject(response);
    }

    /// Queue rows for the next execute with row type `R`.
    pub fn inject_response<R: RowType>(&self, rows: Vec<R>) {
        self.inject(MockResponse::Rows(rows));
    }

    /// Queue raw rows for the next plain `execute`.
    pub fn inject_raw(&self, rows: Vec<RawRow>) {
        self.inject(MockResponse::Rows(rows));
    }

    /// Queue a response without rows.
    pub fn inject_no_data<R: RowType>(&self) {
        self.inject(MockResponse::<R>::NoData);
    }

    /// Queue an error raised by the next execute with row type `R`.
    pub fn inject_error<R: RowType>(&self, error: impl Into<Error>) {
        self.inject(MockResponse::<R>::Error(error.into()));
    }

    /// Queue a frame for the next plain `execute`, returned as-is by
    /// `fetch_frame`.
    pub fn inject_frame(&self, frame: Frame) {
        lock(&self.store).push(None, Payload::Frame(frame));
    }

    /// Queue rows of type `R` read from a CSV file.
    ///
    /// Every cell is read as text (empty cells as null) and converted by the
    /// row mapper, so the file may come from [`record_to_csv`] or be written
    /// by hand.
    ///
    /// [`record_to_csv`]: crate::record::record_to_csv
    pub fn inject_response_from_csv<R: RowType>(&self, path: impl AsRef<Path>, header: bool) -> Result<()> {
        let data = read_csv(path.as_ref(), header)?;
        let rows = data.rows.into_iter().map(map_row::<R>).collect::<Result<Vec<R>>>()?;
        tracing::debug!(target: "typed_sql::mock", path = %path.as_ref().display(), rows = rows.len(), "inject rows from csv");
        self.inject_response(rows);
        Ok(())
    }

    /// Queue a frame read from a CSV file. The header line supplies the
    /// column names, so it cannot be disabled.
    pub fn inject_frame_from_csv(&self, path: impl AsRef<Path>, header: bool) -> Result<()> {
        if !header {
            return Err(Error::CsvHeaderOptionRequired);
        }
        let data = read_csv(path.as_ref(), true)?;
        self.inject_frame(Frame::new(data.header.unwrap_or_default(), data.rows));
        Ok(())
    }

    /// Queue the expectation that the next execute is a write tagged `T`.
    pub fn inject_operation_with_tag<T: Tag>(&self) {
        tracing::debug!(
            target: "typed_sql::mock",
            kind = %T::KIND,
            target_type = std::any::type_name::<T::Target>(),
            "inject tagged write"
        );
        lock(&self.store).push(Some(T::descriptor()), Payload::NoData);
    }

    /// Number of queued responses not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.store).len()
    }

    /// Number of responses requested so far.
    pub fn calls(&self) -> usize {
        lock(&self.store).calls()
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

impl Connection for MockConnection {
    type Cursor = MockCursor;

    fn cursor(&self) -> Result<MockCursor> {
        self.ensure_open()?;
        Ok(Cursor::new(MockBackend::new(self.store())))
    }

    fn commit(&self) -> Result<()> {
        self.ensure_open()
    }

    fn rollback(&self) -> Result<()> {
        self.ensure_open()
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{ExecuteCursor, FrameFetch, RowCursor, SessionScoping};
    use crate::mock::{Insert, Update};
    use crate::test_utils::{write_csv, Account, Person};
    use crate::value::Value;

    fn person(id: i64, name: &str) -> Person {
        Person {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_two_row_scenario() {
        let conn = MockConnection::new();
        conn.inject_response(vec![person(1, "a"), person(2, "b")]);

        let mut cur = conn.execute_map::<Person>("SELECT id, name FROM people", &[]).unwrap();
        assert_eq!(cur.rowcount(), 2);
        assert_eq!(cur.fetchone().unwrap(), Some(person(1, "a")));
        assert_eq!(cur.fetchone().unwrap(), Some(person(2, "b")));
        assert_eq!(cur.fetchone().unwrap(), None);
        assert!(cur.fetchall().unwrap().is_empty());
        assert_eq!(conn.remaining(), 0);
    }

    #[test]
    fn test_unexecuted_cursor_fetch_semantics() {
        let conn = MockConnection::new();
        let mut cur = conn.cursor().unwrap();
        assert_eq!(cur.fetchone().unwrap(), None);
        assert!(matches!(cur.fetchmany(Some(2)), Err(Error::UnexpectedFetch)));
        assert!(matches!(cur.fetchall(), Err(Error::UnexpectedFetch)));
        let mut rows = cur.rows();
        assert!(matches!(rows.next(), Some(Err(Error::UnexpectedFetch))));
        assert!(rows.next().is_none());
        assert_eq!(conn.calls(), 0);
    }

    #[test]
    fn test_no_data_behaves_like_unexecuted() {
        let conn = MockConnection::new();
        conn.inject_no_data::<Person>();
        let mut cur = conn.execute_map::<Person>("DELETE FROM people", &[]).unwrap();
        assert_eq!(cur.rowcount(), -1);
        assert_eq!(cur.fetchone().unwrap(), None);
        assert!(matches!(cur.fetchall(), Err(Error::UnexpectedFetch)));
    }

    #[test]
    fn test_shared_store_across_cursors() {
        let conn = MockConnection::new();
        conn.inject_response(vec![person(1, "a")]);
        conn.inject_raw(vec![vec![Value::Int(9)]]);

        let mut first = conn.execute_map::<Person>("SELECT", &[]).unwrap();
        let mut second = conn.execute("SELECT", &[]).unwrap();
        assert_eq!(second.fetchall().unwrap(), vec![vec![Value::Int(9)]]);
        assert_eq!(first.fetchall().unwrap(), vec![person(1, "a")]);
    }

    #[test]
    fn test_type_mismatch_on_execute() {
        let conn = MockConnection::new();
        conn.inject_response(vec![person(1, "a")]);
        let err = conn.execute_map::<Account>("SELECT", &[]).err().unwrap();
        assert!(matches!(err, Error::ResponseTypeMismatch { call: 1, .. }));
        assert!(matches!(
            conn.execute_map::<Person>("SELECT", &[]).err().unwrap(),
            Error::StoreDataNotFound { call: 2 }
        ));
    }

    #[test]
    fn test_injected_error_raised_by_execute() {
        let conn = MockConnection::new();
        conn.inject_error::<Person>(std::io::Error::other("connection reset"));
        let err = conn.execute_map::<Person>("SELECT", &[]).err().unwrap();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "connection reset");
    }

    #[test]
    fn test_tagged_writes() {
        let conn = MockConnection::new();
        conn.inject_operation_with_tag::<Insert<Person>>();
        conn.inject_operation_with_tag::<Insert<Person>>();
        conn.inject_operation_with_tag::<Insert<Person>>();

        conn.execute_with_tag::<Insert<Person>>("INSERT INTO people VALUES (?1, ?2)", &crate::params![1, "a"])
            .unwrap();
        assert!(matches!(
            conn.execute_with_tag::<Update<Person>>("UPDATE people SET name = 'b'", &[]).err(),
            Some(Error::ResponseTypeMismatch { .. })
        ));
        assert!(matches!(
            conn.execute_with_tag::<Insert<Account>>("INSERT INTO accounts VALUES (1, 0)", &[]).err(),
            Some(Error::ResponseTypeMismatch { .. })
        ));
        assert_eq!(conn.remaining(), 0);
    }

    #[test]
    fn test_tag_does_not_match_plain_execute() {
        let conn = MockConnection::new();
        conn.inject_operation_with_tag::<Insert<Person>>();
        assert!(matches!(
            conn.execute("INSERT", &[]).err(),
            Some(Error::ResponseTypeMismatch { expected: None, .. })
        ));
    }

    #[test]
    fn test_session_scoping_is_noop() {
        let conn = MockConnection::new();
        let mut cur = conn.cursor().unwrap();
        cur.use_warehouse("wh")
            .and_then(|c| c.use_database("db"))
            .and_then(|c| c.use_schema("public"))
            .and_then(|c| c.use_role("analyst"))
            .unwrap();
        assert_eq!(conn.calls(), 0);
    }

    #[test]
    fn test_frame_returned_as_injected() {
        let conn = MockConnection::new();
        let frame = Frame::new(vec!["n".into()], vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
        conn.inject_frame(frame.clone());

        let mut cur = conn.execute("SELECT n", &[]).unwrap();
        assert_eq!(cur.description(), Some(vec!["n".to_string()]));
        assert_eq!(cur.fetch_frame().unwrap(), frame);
        assert!(matches!(cur.fetchone(), Err(Error::RowTypeNotSupported { .. })));
    }

    #[test]
    fn test_response_from_csv() {
        let (_dir, path) = write_csv("id,name\n1,ada\n2,grace\n");
        let conn = MockConnection::new();
        conn.inject_response_from_csv::<Person>(&path, true).unwrap();
        let mut cur = conn.execute_map::<Person>("SELECT", &[]).unwrap();
        assert_eq!(cur.fetchall().unwrap(), vec![person(1, "ada"), person(2, "grace")]);
    }

    #[test]
    fn test_response_from_csv_maps_eagerly() {
        let (_dir, path) = write_csv("id,name\nnot-a-number,ada\n");
        let conn = MockConnection::new();
        let err = conn.inject_response_from_csv::<Person>(&path, true).unwrap_err();
        assert!(matches!(err, Error::Value(_)));
        assert_eq!(conn.remaining(), 0);
    }

    #[test]
    fn test_frame_from_csv_requires_header() {
        let (_dir, path) = write_csv("n\n1\n");
        let conn = MockConnection::new();
        assert!(matches!(
            conn.inject_frame_from_csv(&path, false),
            Err(Error::CsvHeaderOptionRequired)
        ));
        conn.inject_frame_from_csv(&path, true).unwrap();
        let frame = conn.execute("SELECT n", &[]).unwrap().fetch_frame().unwrap();
        assert_eq!(frame.columns, vec!["n".to_string()]);
        assert_eq!(frame.rows, vec![vec![Value::Text("1".into())]]);
    }

    #[test]
    fn test_closed_connection() {
        let mut conn = MockConnection::new();
        conn.close().unwrap();
        assert!(matches!(conn.cursor(), Err(Error::Closed { .. })));
        assert!(matches!(conn.commit(), Err(Error::Closed { .. })));
    }

    #[test]
    fn test_execute_consumes_and_retypes() {
        let conn = MockConnection::new();
        conn.inject_response(vec![(1_i64, "x".to_string())]);
        conn.inject_response(vec![person(5, "e")]);
        let mut cur = conn.cursor().unwrap().execute_map::<(i64, String)>("SELECT", &[]).unwrap();
        assert_eq!(cur.fetchone().unwrap(), Some((1, "x".to_string())));
        let mut cur = cur.execute_map::<Person>("SELECT", &[]).unwrap();
        assert_eq!(cur.row_type(), Person::descriptor());
        assert_eq!(cur.fetchmany(Some(5)).unwrap(), vec![person(5, "e")]);
    }
}
