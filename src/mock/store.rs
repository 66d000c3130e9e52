//! FIFO store of canned responses.
//!
//! Entries are served strictly in injection order, regardless of row type.
//! Each entry is consumed at most once, including entries whose row type
//! did not match the request.

use std::any::Any;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::row::{RowType, RowTypeId};

/// Store shared by a mock connection and every cursor it creates.
pub type SharedStore = Arc<Mutex<MockStore>>;

pub(crate) fn lock(store: &Mutex<MockStore>) -> MutexGuard<'_, MockStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A canned response for one cursor operation.
#[derive(Debug)]
pub enum MockResponse<R> {
    /// Rows served to the fetch calls that follow.
    Rows(Vec<R>),
    /// A response without rows; fetches behave as if nothing was executed.
    NoData,
    /// Raised by the consuming operation.
    Error(Error),
}

impl<R> From<Vec<R>> for MockResponse<R> {
    fn from(rows: Vec<R>) -> Self {
        MockResponse::Rows(rows)
    }
}

/// Type-erased payload of a queued entry.
pub(crate) enum Payload {
    Rows { rows: Box<dyn Any + Send>, count: usize },
    NoData,
    Frame(Frame),
    Failure(Error),
}

/// What a successful `provide` hands to the cursor.
pub(crate) enum Provided {
    Rows { rows: Box<dyn Any + Send>, count: usize },
    NoData,
    Frame(Frame),
}

struct MockEntry {
    row_type: Option<RowTypeId>,
    payload: Payload,
}

#[derive(Default)]
pub struct MockStore {
    entries: VecDeque<MockEntry>,
    calls: usize,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a response for row type `R` to the tail of the queue.
    pub fn inject<R: RowType>(&mut self, response: MockResponse<R>) {
        let payload = match response {
            MockResponse::Rows(rows) => Payload::Rows {
                count: rows.len(),
                rows: Box::new(rows),
            },
            MockResponse::NoData => Payload::NoData,
            MockResponse::Error(error) => Payload::Failure(error),
        };
        self.push(R::descriptor(), payload);
    }

    pub(crate) fn push(&mut self, row_type: Option<RowTypeId>, payload: Payload) {
        tracing::debug!(
            target: "typed_sql::mock",
            row_type = row_type.map_or("<raw rows>", |t| t.name()),
            queued = self.entries.len() + 1,
            "inject response"
        );
        self.entries.push_back(MockEntry { row_type, payload });
    }

    /// Pop the head entry, checking it against the requested row type.
    ///
    /// The type check happens before an injected error is raised, and a
    /// mismatched entry is consumed all the same.
    pub(crate) fn provide(&mut self, expected: Option<RowTypeId>) -> Result<Provided> {
        self.calls += 1;
        let call = self.calls;

        let Some(entry) = self.entries.pop_front() else {
            tracing::debug!(target: "typed_sql::mock", call, "provide on empty store");
            return Err(Error::StoreDataNotFound { call });
        };

        if entry.row_type != expected {
            return Err(Error::ResponseTypeMismatch {
                expected,
                actual: entry.row_type,
                call,
            });
        }

        tracing::debug!(target: "typed_sql::mock", call, remaining = self.entries.len(), "provide response");
        match entry.payload {
            Payload::Rows { rows, count } => Ok(Provided::Rows { rows, count }),
            Payload::NoData => Ok(Provided::NoData),
            Payload::Frame(frame) => Ok(Provided::Frame(frame)),
            Payload::Failure(error) => Err(error),
        }
    }

    /// Pop the head entry as rows of `R`.
    ///
    /// Returns `Ok(None)` for the no-data sentinel, which is distinct from an
    /// injected empty row list.
    pub fn provide_response<R: RowType>(&mut self) -> Result<Option<Vec<R>>> {
        match self.provide(R::descriptor())? {
            Provided::Rows { rows, .. } => rows
                .downcast::<Vec<R>>()
                .map(|rows| Some(*rows))
                .map_err(|_| Error::RowTypeMismatch {
                    expected: R::descriptor(),
                    actual: None,
                }),
            Provided::NoData => Ok(None),
            Provided::Frame(_) => Err(Error::RowTypeNotSupported {
                name: "Frame",
                operation: "row fetch",
            }),
        }
    }

    /// Number of entries still queued.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of `provide` calls made so far, successful or not.
    pub fn calls(&self) -> usize {
        self.calls
    }
}
