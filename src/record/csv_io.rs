//! CSV reading and writing.
//!
//! One row per record, fields in declared order, comma separated with
//! minimal quoting. `Null` is written as an empty field; every field,
//! empty or not, is read back as text.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::row::{header_names, RowType};
use crate::value::{RawRow, Value};

/// Parsed CSV contents.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvData {
    /// Column names, when the file was read with a header line.
    pub header: Option<Vec<String>>,
    pub rows: Vec<RawRow>,
}

/// Read a CSV file. With `header`, the first line holds column names.
pub fn read_csv(path: impl AsRef<Path>, header: bool) -> Result<CsvData> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(header)
        .flexible(true)
        .from_path(path.as_ref())?;

    let names = if header {
        Some(reader.headers()?.iter().map(String::from).collect())
    } else {
        None
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Value::from_csv_field).collect());
    }

    Ok(CsvData { header: names, rows })
}

/// Appends fetched rows to a CSV file.
///
/// The header line, when enabled, is written before the first row and
/// comes from the row type's field names, or from the column names set with
/// [`CsvRecorder::set_columns`] for rows without field names. Once `limit`
/// data rows are written, further rows are dropped.
pub struct CsvRecorder {
    writer: Option<csv::Writer<File>>,
    path: PathBuf,
    header: bool,
    columns: Option<Vec<String>>,
    header_written: bool,
    limit: Option<usize>,
    written: usize,
    limit_reached: bool,
}

impl CsvRecorder {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: impl AsRef<Path>, header: bool, limit: Option<usize>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let writer = csv::Writer::from_path(&path)?;
        tracing::info!(target: "typed_sql::record", path = %path.display(), ?limit, header, "recording rows");
        Ok(Self {
            writer: Some(writer),
            path,
            header,
            columns: None,
            header_written: false,
            limit,
            written: 0,
            limit_reached: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header names used for raw and tuple rows.
    pub fn set_columns(&mut self, columns: Vec<String>) {
        self.columns = Some(columns);
    }

    /// Data rows written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Fails with `RowTypeNotSupported` when a header line is still owed
    /// and neither `R` nor [`CsvRecorder::set_columns`] can name its columns.
    pub fn check_header<R: RowType>(&self) -> Result<()> {
        if !self.header || self.header_written || self.columns.is_some() {
            return Ok(());
        }
        header_names::<R>().map(|_| ())
    }

    pub fn record<R: RowType>(&mut self, row: &R) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(Error::Closed { resource: "recorder" })?;

        if self.header && !self.header_written {
            match (header_names::<R>(), &self.columns) {
                (Ok(names), _) => writer.write_record(names)?,
                (Err(_), Some(columns)) => writer.write_record(columns)?,
                (Err(e), None) => return Err(e),
            }
            self.header_written = true;
        }

        if let Some(limit) = self.limit {
            if self.written >= limit {
                if !self.limit_reached {
                    tracing::info!(target: "typed_sql::record", limit, path = %self.path.display(), "recording limit reached");
                    self.limit_reached = true;
                }
                return Ok(());
            }
        }

        writer.write_record(row.to_values().iter().map(Value::to_csv_field))?;
        self.written += 1;
        Ok(())
    }

    pub fn record_all<R: RowType>(&mut self, rows: &[R]) -> Result<()> {
        rows.iter().try_for_each(|row| self.record(row))
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Flush and release the file. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for CsvRecorder {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(target: "typed_sql::record", error = %e, path = %self.path.display(), "flushing recording on drop failed");
        }
    }
}
