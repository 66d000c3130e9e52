//! Backend serving responses from a mock store.

use std::any::{type_name, Any};
use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::mock::store::{lock, Provided, SharedStore};
use crate::row::{RowType, RowTypeId};
use crate::value::Value;

use super::CursorBackend;

/// Result bound by the last execute call.
enum Bound {
    /// A `VecDeque<R>` for the row type the cursor was executed with.
    Rows(Box<dyn Any + Send>),
    Frame(Frame),
}

/// Mock cursor backend.
///
/// Before any execute call, or after one that consumed a no-data entry,
/// nothing is bound: `fetchone` reports the end of the result while bulk
/// fetches and iteration fail with [`Error::UnexpectedFetch`].
pub struct MockBackend {
    store: SharedStore,
    bound: Option<Bound>,
    rowcount: i64,
    description: Option<Vec<String>>,
}

impl MockBackend {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            bound: None,
            rowcount: -1,
            description: None,
        }
    }

    fn bind<S: RowType>(&mut self, expected: Option<RowTypeId>) -> Result<()> {
        self.bound = None;
        self.rowcount = -1;
        self.description = None;

        let provided = lock(&self.store).provide(expected)?;
        match provided {
            Provided::Rows { rows, count } => {
                let rows = rows
                    .downcast::<Vec<S>>()
                    .map_err(|_| Error::RowTypeMismatch {
                        expected: S::descriptor(),
                        actual: expected,
                    })?;
                let names = S::field_names();
                if !names.is_empty() {
                    self.description = Some(names.iter().map(|n| n.to_string()).collect());
                }
                self.rowcount = i64::try_from(count).unwrap_or(i64::MAX);
                self.bound = Some(Bound::Rows(Box::new(VecDeque::from(*rows))));
            }
            Provided::NoData => {}
            Provided::Frame(frame) => {
                self.description = Some(frame.columns.clone());
                self.rowcount = i64::try_from(frame.len()).unwrap_or(i64::MAX);
                self.bound = Some(Bound::Frame(frame));
            }
        }
        Ok(())
    }

    fn rows_mut<R: RowType>(&mut self) -> Result<Option<&mut VecDeque<R>>> {
        match &mut self.bound {
            None => Ok(None),
            Some(Bound::Rows(rows)) => rows
                .downcast_mut::<VecDeque<R>>()
                .map(Some)
                .ok_or(Error::RowTypeMismatch {
                    expected: R::descriptor(),
                    actual: None,
                }),
            Some(Bound::Frame(_)) => Err(Error::RowTypeNotSupported {
                name: type_name::<R>(),
                operation: "row fetch from a frame response",
            }),
        }
    }
}

impl CursorBackend for MockBackend {
    fn execute<S: RowType>(&mut self, expected: Option<RowTypeId>, _operation: &str, _params: &[Value]) -> Result<()> {
        self.bind::<S>(expected)
    }

    fn executemany<S: RowType>(
        &mut self,
        expected: Option<RowTypeId>,
        _operation: &str,
        _params_seq: &[Vec<Value>],
    ) -> Result<()> {
        self.bind::<S>(expected)
    }

    fn next_row<R: RowType>(&mut self, strict: bool) -> Result<Option<R>> {
        match self.rows_mut::<R>()? {
            Some(rows) => Ok(rows.pop_front()),
            None if strict => Err(Error::UnexpectedFetch),
            None => Ok(None),
        }
    }

    fn next_batch<R: RowType>(&mut self, limit: Option<usize>) -> Result<Vec<R>> {
        let rows = self.rows_mut::<R>()?.ok_or(Error::UnexpectedFetch)?;
        let take = limit.unwrap_or(rows.len()).min(rows.len());
        Ok(rows.drain(..take).collect())
    }

    fn rowcount(&self) -> i64 {
        self.rowcount
    }

    fn description(&self) -> Option<Vec<String>> {
        self.description.clone()
    }

    fn scope_session(&mut self, _statement: &str) -> Result<()> {
        Ok(())
    }

    fn fetch_frame(&mut self) -> Result<Frame> {
        match &self.bound {
            Some(Bound::Frame(frame)) => Ok(frame.clone()),
            Some(Bound::Rows(_)) => Err(Error::RowTypeNotSupported {
                name: "Frame",
                operation: "frame fetch from a row response",
            }),
            None => Err(Error::UnexpectedFetch),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.bound = None;
        Ok(())
    }
}
