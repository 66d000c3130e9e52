//! Fully materialised statement result shared by the driver adapters.

use std::collections::VecDeque;

use crate::value::RawRow;

/// Result of the last execute on a driver cursor.
#[derive(Debug, Default)]
pub struct ResultBuffer {
    columns: Option<Vec<String>>,
    rows: VecDeque<RawRow>,
    rowcount: i64,
}

impl ResultBuffer {
    /// Nothing executed yet.
    pub fn empty() -> Self {
        Self {
            columns: None,
            rows: VecDeque::new(),
            rowcount: -1,
        }
    }

    /// A query result. The rowcount is the number of rows produced.
    pub fn rows(columns: Vec<String>, rows: Vec<RawRow>) -> Self {
        let rowcount = i64::try_from(rows.len()).unwrap_or(i64::MAX);
        Self {
            columns: Some(columns),
            rows: rows.into(),
            rowcount,
        }
    }

    /// A statement without a result set.
    pub fn affected(count: u64) -> Self {
        Self {
            columns: None,
            rows: VecDeque::new(),
            rowcount: i64::try_from(count).unwrap_or(i64::MAX),
        }
    }

    pub fn next(&mut self) -> Option<RawRow> {
        self.rows.pop_front()
    }

    pub fn take(&mut self, size: usize) -> Vec<RawRow> {
        let size = size.min(self.rows.len());
        self.rows.drain(..size).collect()
    }

    pub fn drain(&mut self) -> Vec<RawRow> {
        self.rows.drain(..).collect()
    }

    pub fn rowcount(&self) -> i64 {
        self.rowcount
    }

    pub fn columns(&self) -> Option<Vec<String>> {
        self.columns.clone()
    }

    /// Fold in the rowcount of another statement of the same batch.
    pub fn accumulate(&mut self, other: ResultBuffer) {
        if other.rowcount >= 0 {
            self.rowcount = self.rowcount.max(0) + other.rowcount;
        }
        self.columns = other.columns;
        self.rows = other.rows;
    }
}
