//! Whole-result tabular values.
//!
//! A [`Frame`] is what "fetch the whole result" operations return: the
//! column names plus every remaining row. Mock connections hand back an
//! injected frame as-is instead of building one row by row.

use serde::Serialize;

use crate::value::{RawRow, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl Frame {
    pub fn new(columns: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, by name.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().filter_map(|row| row.get(index)).collect())
    }

    /// Split into frames of at most `batch` rows. An empty frame yields one
    /// empty batch so callers always see the column names.
    pub fn into_batches(self, batch: usize) -> Vec<Frame> {
        let batch = batch.max(1);
        if self.rows.is_empty() {
            return vec![self];
        }
        let columns = self.columns;
        let mut batches = Vec::new();
        let mut rows = self.rows.into_iter().peekable();
        while rows.peek().is_some() {
            let chunk: Vec<RawRow> = rows.by_ref().take(batch).collect();
            batches.push(Frame::new(columns.clone(), chunk));
        }
        batches
    }
}
